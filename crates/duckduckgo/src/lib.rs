//! A search provider for the DuckDuckGo HTML endpoint.

#[macro_use]
extern crate tracing;

mod parse;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::time::Duration;

use chat_relay_model::{
    ErrorKind, ProviderError, Recency, SearchHit, SearchProvider, SearchQuery,
};
use reqwest::{Client, Response, StatusCode, header};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Error type for [`DuckDuckGoProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
            ErrorKind::RateLimitExceeded
        } else {
            ErrorKind::Other
        };
        Self::new(format!("{err}"), kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

/// Web search through `html.duckduckgo.com`, which needs no API key.
#[derive(Clone, Debug)]
pub struct DuckDuckGoProvider {
    client: Client,
    base_url: String,
}

impl DuckDuckGoProvider {
    /// Creates a provider whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Creates a provider that talks to a custom endpoint.
    pub fn with_base_url<S: Into<String>>(
        base_url: S,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                error!("failed to build the HTTP client, using defaults: {err}");
                Client::new()
            });
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Default for DuckDuckGoProvider {
    #[inline]
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl SearchProvider for DuckDuckGoProvider {
    type Error = Error;

    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + 'static
    {
        let url = build_url(&self.base_url, query);
        let max_results = query.max_results;
        let resp_fut = self
            .client
            .get(&url)
            .header(header::ACCEPT, "text/html")
            .send();

        async move {
            debug!("searching: {url}");
            let resp = resp_fut
                .await
                .and_then(Response::error_for_status)
                .map_err(Error::from_transport)?;
            let html = resp.text().await.map_err(Error::from_transport)?;
            let hits = parse::parse_results(&html, max_results);
            if hits.is_empty() && parse::is_challenge_page(&html) {
                return Err(Error::new(
                    "DuckDuckGo refused the request",
                    ErrorKind::RateLimitExceeded,
                ));
            }
            trace!("got {} hits", hits.len());
            Ok(hits)
        }
    }
}

fn build_url(base_url: &str, query: &SearchQuery) -> String {
    let mut url = format!(
        "{}?q={}&kl={}&kp={}",
        base_url,
        urlencoding::encode(&query.query),
        urlencoding::encode(&query.region),
        if query.safe_search { "1" } else { "-2" },
    );
    let df = match query.recency {
        Recency::Day => Some("d"),
        Recency::Week => Some("w"),
        Recency::Month => Some("m"),
        Recency::Year => Some("y"),
        Recency::Any => None,
    };
    if let Some(df) = df {
        url.push_str("&df=");
        url.push_str(df);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let query = SearchQuery::new("rust & tokio", 15);
        assert_eq!(
            build_url(DEFAULT_BASE_URL, &query),
            "https://html.duckduckgo.com/html/?q=rust%20%26%20tokio&kl=wt-wt&kp=1&df=y"
        );

        let query = SearchQuery {
            safe_search: false,
            recency: Recency::Any,
            ..SearchQuery::new("rust", 15)
        };
        assert_eq!(
            build_url("http://localhost/html/", &query),
            "http://localhost/html/?q=rust&kl=wt-wt&kp=-2"
        );
    }
}
