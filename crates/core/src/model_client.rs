use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chat_relay_model::{
    ChatMessage, ChatRequest, CompletionRequest, ModelProvider, SamplingParams,
};
use tracing::Instrument;

use crate::error::CompletionError;
use crate::retry::{RetryPolicy, call_with_retry};
use crate::settings::MODEL_MAX_TOKENS;

type TextResult = Result<String, CompletionError>;
type BoxedTextFuture = Pin<Box<dyn Future<Output = TextResult> + Send>>;
type ChatFn = Arc<dyn Fn(ChatRequest) -> BoxedTextFuture + Send + Sync>;
type CompletionFn =
    Arc<dyn Fn(CompletionRequest) -> BoxedTextFuture + Send + Sync>;

/// Options of a [`ModelClient`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelOptions {
    /// Sampling parameters of chat requests. Single-prompt requests use
    /// the same temperature and nucleus with a computed token budget.
    pub sampling: SamplingParams,
    /// Output token limit of the provider, used for the single-prompt
    /// budget.
    pub provider_max_tokens: u32,
    /// Timeout of a single provider call.
    pub timeout: Duration,
    /// Retry policy of provider calls.
    pub retry: RetryPolicy,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            provider_max_tokens: MODEL_MAX_TOKENS,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// A wrapper around a model provider that bounds, retries and classifies
/// its calls, and provides a type-erased interface for the other modules.
///
/// Errors never escape as provider errors: every failure is mapped to a
/// [`CompletionError`] whose text can be shown to the user.
#[derive(Clone)]
pub struct ModelClient {
    chat_fn: ChatFn,
    completion_fn: CompletionFn,
    options: ModelOptions,
}

impl ModelClient {
    /// Creates a client with default options.
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // Erase `P`, so that the controller doesn't need a generic
        // parameter for it.
        let provider = Arc::new(provider);

        let chat_provider = Arc::clone(&provider);
        let chat_fn: ChatFn = Arc::new(move |req| {
            let fut = chat_provider.send_chat(&req);
            Box::pin(
                async move {
                    trace!("got a chat request: {:?}", req);
                    fut.await.map_err(|err| {
                        error!("chat request failed: {err}");
                        CompletionError::from_provider(&err)
                    })
                }
                .instrument(trace_span!("chat req")),
            )
        });

        let completion_fn: CompletionFn = Arc::new(move |req| {
            let fut = provider.send_completion(&req);
            Box::pin(
                async move {
                    trace!("got a completion request: {:?}", req);
                    fut.await.map_err(|err| {
                        error!("completion request failed: {err}");
                        CompletionError::from_provider(&err)
                    })
                }
                .instrument(trace_span!("completion req")),
            )
        });

        Self {
            chat_fn,
            completion_fn,
            options: ModelOptions::default(),
        }
    }

    /// Replaces the options.
    #[inline]
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends the messages to the chat endpoint and returns the trimmed
    /// answer.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> TextResult {
        let req = ChatRequest {
            messages,
            sampling: self.options.sampling,
        };
        let text = call_with_retry(
            self.options.retry,
            self.options.timeout,
            "chat request",
            || (self.chat_fn)(req.clone()),
        )
        .await?;
        Ok(text.trim().to_owned())
    }

    /// Sends a single prompt to the completion endpoint and returns the
    /// trimmed answer.
    ///
    /// The output budget is derived from the prompt length; a prompt that
    /// leaves no room for an answer is rejected without calling the
    /// provider.
    pub async fn complete(&self, prompt: &str) -> TextResult {
        let Some(max_tokens) =
            completion_budget(self.options.provider_max_tokens, prompt)
        else {
            debug!("prompt of {} bytes exceeds the budget", prompt.len());
            return Err(CompletionError::PromptTooLong);
        };
        let req = CompletionRequest {
            prompt: prompt.to_owned(),
            sampling: SamplingParams {
                max_tokens,
                ..self.options.sampling
            },
        };
        let text = call_with_retry(
            self.options.retry,
            self.options.timeout,
            "completion request",
            || (self.completion_fn)(req.clone()),
        )
        .await?;
        Ok(text.trim().to_owned())
    }
}

/// Output token budget of a single-prompt request: half of the provider
/// limit minus the prompt's word count. `None` if nothing is left.
///
/// Word count only approximates the token count.
pub fn completion_budget(provider_max_tokens: u32, prompt: &str) -> Option<u32> {
    let words = prompt.split_whitespace().count();
    let budget = i64::from(provider_max_tokens / 2)
        - i64::try_from(words).unwrap_or(i64::MAX);
    u32::try_from(budget).ok().filter(|&budget| budget > 0)
}
