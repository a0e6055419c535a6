use std::time::Duration;

use chat_relay_model::SamplingParams;

use crate::access::Allowlist;
use crate::retry::RetryPolicy;
use crate::search::VIDEO_HOSTINGS;

/// Output token limit of the completion provider.
pub const MODEL_MAX_TOKENS: u32 = 4096;
/// Upper bound of the per-conversation history size.
pub const MAX_HISTORY_SIZE: usize = 50;
/// Upper bound of the search results included in a prompt.
pub const MAX_SEARCH_RESULTS: usize = 10;
/// Raw results requested from the search provider before filtering.
pub const MAX_RAW_SEARCH_RESULTS: usize = 15;

/// Tunables of a [`Relay`](crate::Relay).
///
/// Setters clamp their input to the documented caps, so a constructed
/// value is always within bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct RelaySettings {
    chat_model: String,
    version: String,
    history_size: usize,
    num_search_results: usize,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    allowlist: Allowlist,
    request_timeout: Duration,
    retry: RetryPolicy,
    video_hostings: Vec<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            chat_model: "gpt-3.5-turbo".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            history_size: 20,
            num_search_results: 3,
            max_tokens: 500,
            temperature: 0.7,
            top_p: 0.9,
            allowlist: Allowlist::default(),
            request_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            video_hostings: VIDEO_HOSTINGS.iter().map(|&h| h.to_owned()).collect(),
        }
    }
}

impl RelaySettings {
    /// Sets the chat model name shown by `/start` and `/info`.
    #[inline]
    pub fn with_chat_model<S: Into<String>>(mut self, model: S) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Sets the version shown by `/info`.
    #[inline]
    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the history bound, clamped to `1..=MAX_HISTORY_SIZE`.
    #[inline]
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size.clamp(1, MAX_HISTORY_SIZE);
        self
    }

    /// Sets the number of search results per prompt, capped at
    /// [`MAX_SEARCH_RESULTS`].
    #[inline]
    pub fn with_num_search_results(mut self, num: usize) -> Self {
        self.num_search_results = num.min(MAX_SEARCH_RESULTS);
        self
    }

    /// Sets the output token limit of chat requests, capped at
    /// [`MODEL_MAX_TOKENS`].
    #[inline]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens.min(MODEL_MAX_TOKENS);
        self
    }

    /// Sets the sampling temperature and nucleus.
    #[inline]
    pub fn with_sampling(mut self, temperature: f32, top_p: f32) -> Self {
        self.temperature = temperature;
        self.top_p = top_p;
        self
    }

    /// Restricts the relay to the given ids.
    #[inline]
    pub fn with_allowlist(mut self, allowlist: Allowlist) -> Self {
        self.allowlist = allowlist;
        self
    }

    /// Sets the timeout of a single provider call.
    #[inline]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the retry policy of provider calls.
    #[inline]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the hosts whose search results are dropped.
    pub fn with_video_hostings<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.video_hostings = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Chat model name.
    #[inline]
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Version reported by `/info`.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Per-conversation history bound.
    #[inline]
    pub fn history_size(&self) -> usize {
        self.history_size
    }

    /// Search results included in a prompt.
    #[inline]
    pub fn num_search_results(&self) -> usize {
        self.num_search_results
    }

    /// Output token limit of chat requests.
    #[inline]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Ids allowed to use the relay.
    #[inline]
    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    /// Timeout of a single provider call.
    #[inline]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Retry policy of provider calls.
    #[inline]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Hosts whose search results are dropped.
    #[inline]
    pub fn video_hostings(&self) -> &[String] {
        &self.video_hostings
    }

    /// Sampling parameters of chat requests.
    #[inline]
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RelaySettings::default();
        assert_eq!(settings.chat_model(), "gpt-3.5-turbo");
        assert_eq!(settings.history_size(), 20);
        assert_eq!(settings.num_search_results(), 3);
        assert_eq!(settings.max_tokens(), 500);
        assert_eq!(settings.request_timeout(), Duration::from_secs(60));
        assert!(settings.allowlist().is_public());
        assert!(settings.video_hostings().iter().any(|h| h == "youtube.com"));
    }

    #[test]
    fn test_caps() {
        let settings = RelaySettings::default()
            .with_history_size(500)
            .with_num_search_results(99)
            .with_max_tokens(100_000);
        assert_eq!(settings.history_size(), MAX_HISTORY_SIZE);
        assert_eq!(settings.num_search_results(), MAX_SEARCH_RESULTS);
        assert_eq!(settings.max_tokens(), MODEL_MAX_TOKENS);

        let settings = RelaySettings::default().with_history_size(0);
        assert_eq!(settings.history_size(), 1);
    }
}
