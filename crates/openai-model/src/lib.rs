//! A model provider for OpenAI-compatible APIs.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use chat_relay_model::{
    ChatRequest, CompletionRequest, ErrorKind, ModelProvider, ProviderError,
};
use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use config::{OpenAIConfig, OpenAIConfigBuilder};
use proto::{
    ChatCompletionResponse, ErrorResponse, FirstChoice, TextCompletionResponse,
};

/// Error type for [`OpenAIProvider`].
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
        } else {
            ErrorKind::Other
        };
        Self::new(format!("{err}"), kind)
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        let kind = if status == StatusCode::TOO_MANY_REQUESTS {
            ErrorKind::RateLimitExceeded
        } else {
            ErrorKind::Other
        };
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(resp) => resp.error.message,
            Err(_) => format!("HTTP status {status}"),
        };
        Self::new(message, kind)
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

/// OpenAI-compatible model provider.
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: Client,
    config: Arc<OpenAIConfig>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenAIConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|err| {
                error!("failed to build the HTTP client, using defaults: {err}");
                Client::new()
            });
        Self {
            client,
            config: Arc::new(config),
        }
    }

    fn post<B: Serialize, T: FirstChoice + DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> impl Future<Output = Result<String, Error>> + Send + 'static + use<B, T>
    {
        let resp_fut = self
            .client
            .post(format!("{}{}", self.config.base_url, path))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send();

        async move {
            let resp = resp_fut.await.map_err(Error::from_transport)?;
            let parsed: T = read_json(resp).await?;
            parsed.into_first_text().ok_or_else(|| {
                Error::new("Response contains no choices", ErrorKind::Other)
            })
        }
    }
}

impl ModelProvider for OpenAIProvider {
    type Error = Error;

    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        trace!("sending {} chat messages", req.messages.len());
        let body = proto::create_chat_request(req, &self.config);
        self.post::<_, ChatCompletionResponse>("/chat/completions", &body)
    }

    fn send_completion(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        trace!("sending a prompt of {} bytes", req.prompt.len());
        let body = proto::create_completion_request(req, &self.config);
        self.post::<_, TextCompletionResponse>("/completions", &body)
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let body = resp.text().await.map_err(Error::from_transport)?;

    if !status.is_success() {
        let err = Error::from_status(status, &body);
        warn!("request failed with {status}: {}", err.message);
        return Err(err);
    }

    let is_valid_content_type = content_type
        .as_deref()
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| m.subtype() == mime::JSON)
        .unwrap_or(false);
    if !is_valid_content_type {
        return Err(Error::new(
            format!("Unexpected content type: {content_type:?}"),
            ErrorKind::Other,
        ));
    }

    serde_json::from_str(&body)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = Error::from_status(
            StatusCode::TOO_MANY_REQUESTS,
            include_str!("../fixtures/rate_limit_error.json"),
        );
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        assert!(err.message().starts_with("Rate limit reached"));

        let err = Error::from_status(StatusCode::BAD_GATEWAY, "<html></html>");
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.message(), "HTTP status 502 Bad Gateway");
    }
}
