//! Local fake providers for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::pending;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chat_relay_model::{
    ChatRequest, CompletionRequest, ErrorKind, ModelProvider, ProviderError,
    Role, SearchHit, SearchProvider, SearchQuery,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A request received by [`TestModelProvider`].
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedRequest {
    /// A multi-turn request.
    Chat(ChatRequest),
    /// A single-prompt request.
    Completion(CompletionRequest),
}

#[derive(Default)]
struct ModelScript {
    replies: VecDeque<PresetReply>,
    requests: Vec<RecordedRequest>,
    delay: Option<Duration>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request in order. If there are no enough
/// replies in the script, an error will be returned.
///
/// Clones share the same script, so a test can keep a clone around to
/// inspect the received requests after moving the provider elsewhere.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<ModelScript>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_reply(&self, preset: PresetReply) {
        self.lock().replies.push_back(preset);
    }

    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.lock().delay = Some(duration);
    }

    /// Returns all requests received so far.
    #[inline]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    #[inline]
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, ModelScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(
        &self,
        request: RecordedRequest,
        echo: String,
    ) -> impl Future<Output = Result<String, Error>> + Send + 'static {
        let (preset, delay) = {
            let mut script = self.lock();
            script.requests.push(request);
            (script.replies.pop_front(), script.delay)
        };

        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            let Some(preset) = preset else {
                return Err(Error {
                    message: "no enough replies".to_owned(),
                    kind: ErrorKind::Other,
                });
            };
            match preset {
                PresetReply::Text(text) => Ok(text),
                PresetReply::Echo => Ok(format!("You said {echo}")),
                PresetReply::RateLimited => Err(Error {
                    message: "too many requests".to_owned(),
                    kind: ErrorKind::RateLimitExceeded,
                }),
                PresetReply::Failure(message) => Err(Error {
                    message,
                    kind: ErrorKind::Other,
                }),
                PresetReply::Stall => pending().await,
            }
        }
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let echo = req
            .messages
            .iter()
            .rev()
            .find(|msg| msg.role == Role::User)
            .map(|msg| msg.content.clone())
            .unwrap_or_default();
        self.respond(RecordedRequest::Chat(req.clone()), echo)
    }

    fn send_completion(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        self.respond(
            RecordedRequest::Completion(req.clone()),
            req.prompt.clone(),
        )
    }
}

#[derive(Default)]
struct SearchScript {
    preset: PresetSearch,
    queries: Vec<SearchQuery>,
}

/// A local fake search engine for testing purpose.
///
/// Clones share the same state, like [`TestModelProvider`].
#[derive(Clone, Default)]
pub struct TestSearchProvider {
    script: Arc<Mutex<SearchScript>>,
}

impl TestSearchProvider {
    /// Creates a search engine that always returns `hits`.
    #[inline]
    pub fn with_hits(hits: impl Into<Vec<SearchHit>>) -> Self {
        let provider = Self::default();
        provider.set_preset(PresetSearch::Hits(hits.into()));
        provider
    }

    #[inline]
    pub fn set_preset(&self, preset: PresetSearch) {
        self.lock().preset = preset;
    }

    /// Returns all queries received so far.
    #[inline]
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.lock().queries.clone()
    }

    #[inline]
    pub fn call_count(&self) -> usize {
        self.lock().queries.len()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, SearchScript> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for TestSearchProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSearchProvider").finish_non_exhaustive()
    }
}

impl SearchProvider for TestSearchProvider {
    type Error = crate::Error;

    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + 'static
    {
        let result = {
            let mut script = self.lock();
            script.queries.push(query.clone());
            match &script.preset {
                PresetSearch::Hits(hits) => Ok(hits
                    .iter()
                    .take(query.max_results)
                    .cloned()
                    .collect()),
                PresetSearch::Failure(message) => Err(Error {
                    message: message.clone(),
                    kind: ErrorKind::Other,
                }),
            }
        };
        std::future::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use chat_relay_model::{ChatMessage, SamplingParams};

    use super::*;

    fn chat(messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            messages,
            sampling: SamplingParams::default(),
        }
    }

    #[tokio::test]
    async fn test_scripted_replies() {
        let provider = TestModelProvider::default();
        provider.add_reply(PresetReply::text("Hello, world!"));
        provider.add_reply(PresetReply::Echo);
        provider.add_reply(PresetReply::RateLimited);

        let req = chat(vec![ChatMessage::user("Hi")]);
        assert_eq!(provider.send_chat(&req).await.unwrap(), "Hello, world!");

        let req = chat(vec![
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello, world!"),
            ChatMessage::user("Check my todo"),
        ]);
        assert_eq!(
            provider.send_chat(&req).await.unwrap(),
            "You said Check my todo"
        );

        let err = provider.send_chat(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);

        let err = provider.send_chat(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let provider = TestModelProvider::default();
        let observer = provider.clone();
        observer.add_reply(PresetReply::Echo);

        let req = CompletionRequest {
            prompt: "Query: rust".to_owned(),
            sampling: SamplingParams::default(),
        };
        assert_eq!(
            provider.send_completion(&req).await.unwrap(),
            "You said Query: rust"
        );
        assert_eq!(observer.requests(), vec![RecordedRequest::Completion(req)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let provider = TestModelProvider::default();
        provider.set_delay(Duration::from_secs(5));
        provider.add_reply(PresetReply::text("late"));

        let start = tokio::time::Instant::now();
        let req = chat(vec![ChatMessage::user("Hi")]);
        assert_eq!(provider.send_chat(&req).await.unwrap(), "late");
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_search() {
        let provider = TestSearchProvider::with_hits([
            hit("A", "https://a.com"),
            hit("B", "https://b.com"),
            hit("C", "https://c.com"),
        ]);
        let hits = provider.search(&SearchQuery::new("q", 2)).await.unwrap();
        assert_eq!(hits, vec![hit("A", "https://a.com"), hit("B", "https://b.com")]);

        provider.set_preset(PresetSearch::Failure("offline".to_owned()));
        let err = provider.search(&SearchQuery::new("q", 2)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.queries()[0].query, "q");
    }
}
