use serde::{Deserialize, Serialize};

/// How recent the search results should be.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Recency {
    /// Past day.
    Day,
    /// Past week.
    Week,
    /// Past month.
    Month,
    /// Past year.
    #[default]
    Year,
    /// No restriction.
    Any,
}

/// A web search request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    /// The search terms.
    pub query: String,
    /// Region code, e.g. `wt-wt` for "no region".
    pub region: String,
    /// Whether safe search is on.
    pub safe_search: bool,
    /// Recency window.
    pub recency: Recency,
    /// Upper bound of returned hits.
    pub max_results: usize,
}

impl SearchQuery {
    /// Creates a query with worldwide region, safe search on and the
    /// past-year recency window.
    #[inline]
    pub fn new<S: Into<String>>(query: S, max_results: usize) -> Self {
        Self {
            query: query.into(),
            region: "wt-wt".to_owned(),
            safe_search: true,
            recency: Recency::Year,
            max_results,
        }
    }
}

/// A single search result.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchHit {
    /// The snippet text.
    pub body: String,
    /// The result URL.
    pub href: String,
}
