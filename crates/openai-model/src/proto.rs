use chat_relay_model::{ChatMessage, ChatRequest, CompletionRequest};
use serde::{Deserialize, Serialize};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TextCompletionResponse {
    pub choices: Vec<TextChoice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TextChoice {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub message: String,
    pub r#type: Option<String>,
}

/// Extracts the generated text of the first choice.
pub trait FirstChoice {
    fn into_first_text(self) -> Option<String>;
}

impl FirstChoice for ChatCompletionResponse {
    #[inline]
    fn into_first_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

impl FirstChoice for TextCompletionResponse {
    #[inline]
    fn into_first_text(self) -> Option<String> {
        Some(self.choices.into_iter().next()?.text)
    }
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextCompletionRequest {
    model: String,
    prompt: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_chat_request(
    req: &ChatRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        temperature: req.sampling.temperature,
        top_p: req.sampling.top_p,
        max_tokens: req.sampling.max_tokens,
        messages: req.messages.clone(),
    }
}

#[inline]
pub fn create_completion_request(
    req: &CompletionRequest,
    config: &OpenAIConfig,
) -> TextCompletionRequest {
    TextCompletionRequest {
        model: config.completion_model.clone(),
        prompt: req.prompt.clone(),
        temperature: req.sampling.temperature,
        top_p: req.sampling.top_p,
        max_tokens: req.sampling.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use chat_relay_model::SamplingParams;
    use serde_json::json;

    use super::*;
    use crate::OpenAIConfigBuilder;

    fn config() -> OpenAIConfig {
        OpenAIConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .with_completion_model("custom-instruct")
            .build()
    }

    #[test]
    fn test_create_chat_request() {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::user("Hello"),
                ChatMessage::assistant("Hi! How can I help?"),
            ],
            sampling: SamplingParams {
                temperature: 0.5,
                top_p: 0.25,
                max_tokens: 100,
            },
        };
        let value =
            serde_json::to_value(create_chat_request(&request, &config()))
                .unwrap();
        assert_eq!(
            value,
            json!({
                "model": "custom",
                "temperature": 0.5,
                "top_p": 0.25,
                "max_tokens": 100,
                "messages": [
                    { "role": "user", "content": "Hello" },
                    { "role": "assistant", "content": "Hi! How can I help?" }
                ]
            })
        );
    }

    #[test]
    fn test_create_completion_request() {
        let request = CompletionRequest {
            prompt: "Query: rust".to_owned(),
            sampling: SamplingParams {
                temperature: 0.5,
                top_p: 0.25,
                max_tokens: 2046,
            },
        };
        let value = serde_json::to_value(create_completion_request(
            &request,
            &config(),
        ))
        .unwrap();
        assert_eq!(
            value,
            json!({
                "model": "custom-instruct",
                "prompt": "Query: rust",
                "temperature": 0.5,
                "top_p": 0.25,
                "max_tokens": 2046
            })
        );
    }

    #[test]
    fn test_parse_responses() {
        let chat: ChatCompletionResponse = serde_json::from_str(include_str!(
            "../fixtures/chat_response.json"
        ))
        .unwrap();
        assert_eq!(
            chat.into_first_text().unwrap(),
            "\n\nRust 1.0 was released on May 15, 2015.  "
        );

        let text: TextCompletionResponse = serde_json::from_str(include_str!(
            "../fixtures/completion_response.json"
        ))
        .unwrap();
        assert_eq!(
            text.into_first_text().unwrap(),
            "\n\nThe tallest mountain on Earth is Mount Everest [1]."
        );

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert_eq!(empty.into_first_text(), None);
    }

    #[test]
    fn test_parse_error() {
        let err: ErrorResponse = serde_json::from_str(include_str!(
            "../fixtures/rate_limit_error.json"
        ))
        .unwrap();
        assert_eq!(err.error.r#type.as_deref(), Some("requests"));
        assert!(err.error.message.starts_with("Rate limit reached"));
    }
}
