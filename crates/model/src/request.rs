use serde::{Deserialize, Serialize};

/// The author of a chat message.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The model.
    Assistant,
}

/// A complete chat message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// The text of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message written by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a message written by the model.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters shared by both request shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingParams {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling probability mass.
    pub top_p: f32,
    /// Upper bound of generated tokens.
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    #[inline]
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 500,
        }
    }
}

/// A multi-turn request to be sent to the chat endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    /// The input messages, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Sampling parameters.
    pub sampling: SamplingParams,
}

/// A single-prompt request to be sent to the completion endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    /// The prompt text.
    pub prompt: String,
    /// Sampling parameters.
    pub sampling: SamplingParams,
}
