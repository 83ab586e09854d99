//! Wire types for the chat-completions and toxicity endpoints

use serde::{Deserialize, Serialize};

/// Fallback reply used when the chat endpoint returns zero choices.
pub const NO_RESPONSE_FALLBACK: &str = "🤖 No response received.";

/// Chat-completions request body
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Ordered conversation messages
    pub messages: Vec<ChatMessage>,
}

/// A single role/content message
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("system", "user", "assistant")
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completions response body
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Ordered choices; only the first is used
    pub choices: Vec<ChatChoice>,
}

/// A single response choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

impl ChatResponse {
    /// Extract the first choice's content
    ///
    /// Zero choices is a soft condition, not an error: the endpoint answered
    /// but had nothing to say, so a fixed fallback string stands in.
    pub fn first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string())
    }
}

/// Toxicity-analysis request body
#[derive(Debug, Serialize)]
pub struct ToxicityRequest {
    /// Text to score
    pub text: String,
}

/// Toxicity-analysis verdict
///
/// The score is passed through as reported; the endpoint documents no range.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ToxicityVerdict {
    /// Whether the text crossed the endpoint's toxicity threshold
    #[serde(rename = "toxic")]
    pub is_toxic: bool,
    /// Raw toxicity score
    pub score: f64,
}
