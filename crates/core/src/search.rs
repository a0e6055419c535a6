//! Web search: querying the provider, dropping uncitable results and
//! rendering the rest as a numbered list.

use std::fmt::Write;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chat_relay_model::{SearchHit, SearchProvider, SearchQuery};
use tracing::Instrument;

use crate::error::SearchError;
use crate::retry::{RetryPolicy, call_with_retry};
use crate::settings::MAX_RAW_SEARCH_RESULTS;

/// Hosts whose results are videos, which the model cannot cite.
pub const VIDEO_HOSTINGS: &[&str] = &[
    "youtube.com",
    "vimeo.com",
    "dailymotion.com",
    "twitch.tv",
    "tiktok.co",
];

const HEADER: &str = "Web search results:\n\n";

type SearchResult = Result<Vec<SearchHit>, SearchError>;
type BoxedSearchFuture = Pin<Box<dyn Future<Output = SearchResult> + Send>>;
type SearchFn = Arc<dyn Fn(SearchQuery) -> BoxedSearchFuture + Send + Sync>;

/// Options of a [`SearchClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    /// Raw results requested from the provider, before filtering.
    pub max_raw_results: usize,
    /// Results whose host contains any of these strings are dropped.
    pub denylist: Vec<String>,
    /// Timeout of a single provider call.
    pub timeout: Duration,
    /// Retry policy of provider calls.
    pub retry: RetryPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_raw_results: MAX_RAW_SEARCH_RESULTS,
            denylist: VIDEO_HOSTINGS.iter().map(|&h| h.to_owned()).collect(),
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// Search results rendered for a prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedResults {
    text: String,
    count: usize,
}

impl FormattedResults {
    /// The rendered text, starting with the header line.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of rendered entries. Zero is a valid result.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[cfg(test)]
    pub(crate) fn from_parts(text: &str, count: usize) -> Self {
        Self {
            text: text.to_owned(),
            count,
        }
    }
}

/// A type-erased wrapper around a search provider.
#[derive(Clone)]
pub struct SearchClient {
    search_fn: SearchFn,
    options: SearchOptions,
}

impl SearchClient {
    /// Creates a client with default options.
    pub fn new<P: SearchProvider + 'static>(provider: P) -> Self {
        let provider = Arc::new(provider);
        let search_fn: SearchFn = Arc::new(move |query| {
            let fut = provider.search(&query);
            Box::pin(
                async move {
                    fut.await.map_err(|err| {
                        warn!("search provider failed: {err}");
                        SearchError::from_provider(&err)
                    })
                }
                .instrument(trace_span!("search req")),
            )
        });
        Self {
            search_fn,
            options: SearchOptions::default(),
        }
    }

    /// Replaces the options.
    #[inline]
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Searches the web for `query` and renders at most `max_results`
    /// citable results.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<FormattedResults, SearchError> {
        let request = SearchQuery::new(query, self.options.max_raw_results);
        let hits = call_with_retry(
            self.options.retry,
            self.options.timeout,
            "web search",
            || (self.search_fn)(request.clone()),
        )
        .await?;

        let raw_count = hits.len();
        let kept = filter_hits(hits, &self.options.denylist);
        debug!("search returned {raw_count} hits, {} citable", kept.len());
        Ok(format_results(kept.iter().take(max_results)))
    }
}

/// Returns the host segment of a URL, `None` if it has no scheme.
fn host_of(href: &str) -> Option<&str> {
    let (_, rest) = href.split_once("://")?;
    rest.split(['/', '?', '#']).next()
}

fn is_denied(href: &str, denylist: &[String]) -> bool {
    host_of(href)
        .is_some_and(|host| denylist.iter().any(|d| host.contains(d.as_str())))
}

fn filter_hits(hits: Vec<SearchHit>, denylist: &[String]) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|hit| !is_denied(&hit.href, denylist))
        .collect()
}

fn format_results<'a>(hits: impl Iterator<Item = &'a SearchHit>) -> FormattedResults {
    let mut text = HEADER.to_owned();
    let mut count = 0;
    for (idx, hit) in hits.enumerate() {
        // Writing into a `String` cannot fail.
        let _ = write!(text, "[{}]: {}…\nURL: {}\n", idx + 1, hit.body, hit.href);
        count += 1;
    }
    FormattedResults { text, count }
}
