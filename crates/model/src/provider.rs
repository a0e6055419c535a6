use std::error::Error;

use crate::error::ErrorKind;
use crate::request::{ChatRequest, CompletionRequest};
use crate::search::{SearchHit, SearchQuery};

/// The error type for a provider.
pub trait ProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which generates text either
/// from a role-tagged message list or from a single prompt.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ProviderError;

    /// Sends a multi-turn request to the chat endpoint and returns the
    /// text of the first choice.
    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;

    /// Sends a single prompt to the completion endpoint and returns the
    /// text of the first choice.
    fn send_completion(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;
}

/// A type that represents a web search engine.
///
/// The same statelessness rules as [`ModelProvider`] apply.
pub trait SearchProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ProviderError;

    /// Runs a search and returns the hits in the engine's relevance order.
    ///
    /// Implementations must not return more than `query.max_results` hits.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + 'static;
}
