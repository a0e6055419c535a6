use chat_relay_model::{ErrorKind, ProviderError};
use thiserror::Error;

use crate::retry::Transient;

/// Failure of a call to the model provider.
///
/// The `Display` output is the text shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The provider asked us to slow down.
    #[error("OpenAI API rate limit exceeded! Please try again later.")]
    RateLimited,
    /// The provider could not be reached or returned an error.
    #[error("OpenAI API error: {0}")]
    Unavailable(String),
    /// The provider did not answer in time.
    #[error("OpenAI API did not answer in time. Please try again later.")]
    Timeout,
    /// The prompt leaves no room for an answer.
    #[error("The query is too long to generate an answer for it.")]
    PromptTooLong,
}

impl CompletionError {
    pub(crate) fn from_provider(err: &dyn ProviderError) -> Self {
        match err.kind() {
            ErrorKind::RateLimitExceeded => Self::RateLimited,
            ErrorKind::Timeout => Self::Timeout,
            ErrorKind::Other => Self::Unavailable(err.to_string()),
        }
    }
}

impl Transient for CompletionError {
    #[inline]
    fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }

    #[inline]
    fn timed_out() -> Self {
        Self::Timeout
    }
}

/// Failure of a call to the search provider.
///
/// The `Display` output is the text shown to the user; details are only
/// logged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The search engine could not be reached or returned garbage.
    #[error("Something went wrong with the web search. Try again later.")]
    Unavailable(String),
    /// The search engine refused to serve more requests for now.
    #[error("The search engine is throttling requests. Try again later.")]
    Throttled,
    /// The search engine did not answer in time.
    #[error("The web search took too long. Try again later.")]
    Timeout,
}

impl SearchError {
    pub(crate) fn from_provider(err: &dyn ProviderError) -> Self {
        match err.kind() {
            ErrorKind::RateLimitExceeded => Self::Throttled,
            ErrorKind::Timeout => Self::Timeout,
            ErrorKind::Other => Self::Unavailable(err.to_string()),
        }
    }
}

impl Transient for SearchError {
    #[inline]
    fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }

    #[inline]
    fn timed_out() -> Self {
        Self::Timeout
    }
}
