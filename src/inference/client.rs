//! HTTP inference client and the service trait it implements
//!
//! The dispatch pipeline talks to `InferenceService`, not to HTTP directly,
//! so tests can inject deterministic doubles. `HttpInferenceClient` is the
//! one production implementation.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::inference::config::InferenceConfig;
use crate::inference::wire::{ChatMessage, ChatRequest, ChatResponse, ToxicityRequest, ToxicityVerdict};

/// Chat-completion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferError {
    /// Network or connection failure
    #[error("chat request failed: {0}")]
    Transport(String),

    /// The endpoint answered with no body at all
    #[error("chat endpoint returned an empty body")]
    EmptyResponse,

    /// The body was present but did not match the expected schema
    #[error("chat response did not match the expected schema")]
    Decode,
}

/// Toxicity-analysis failures
///
/// These are advisory: the pipeline logs them and moves on without touching
/// the reply already on screen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToxicityError {
    /// Network or connection failure
    #[error("toxicity request failed: {0}")]
    Transport(String),

    /// Missing body, malformed JSON, or missing/mistyped fields
    #[error("toxicity response was malformed")]
    Malformed,
}

/// Remote inference operations
///
/// `analyze_toxicity` is only ever invoked after `infer` succeeds, but the
/// two calls fail independently.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Ask the LLM for a reply to the prompt
    async fn infer(&self, prompt: &str) -> Result<String, InferError>;

    /// Score a text for harmful content
    async fn analyze_toxicity(&self, text: &str) -> Result<ToxicityVerdict, ToxicityError>;
}

/// Parse a chat-completions body into the reply text
fn parse_chat_body(body: &str) -> Result<String, InferError> {
    if body.trim().is_empty() {
        return Err(InferError::EmptyResponse);
    }
    let response: ChatResponse = serde_json::from_str(body).map_err(|_| InferError::Decode)?;
    Ok(response.first_content())
}

/// Parse a toxicity-analysis body into a verdict
fn parse_toxicity_body(body: &str) -> Result<ToxicityVerdict, ToxicityError> {
    if body.trim().is_empty() {
        return Err(ToxicityError::Malformed);
    }
    serde_json::from_str(body).map_err(|_| ToxicityError::Malformed)
}

/// Production inference client over HTTP
pub struct HttpInferenceClient {
    config: InferenceConfig,
    http: reqwest::Client,
}

impl HttpInferenceClient {
    /// Create a client with the given configuration
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Access the active configuration
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
}

#[async_trait]
impl InferenceService for HttpInferenceClient {
    async fn infer(&self, prompt: &str) -> Result<String, InferError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(&self.config.persona),
                ChatMessage::user(prompt),
            ],
        };

        debug!("POST {} model={}", self.config.chat_url, self.config.model);

        let response = self
            .http
            .post(&self.config.chat_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferError::Transport(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| InferError::Transport(e.to_string()))?;

        parse_chat_body(&body)
    }

    async fn analyze_toxicity(&self, text: &str) -> Result<ToxicityVerdict, ToxicityError> {
        let request = ToxicityRequest {
            text: text.to_string(),
        };

        debug!("POST {}", self.config.toxicity_url);

        let response = self
            .http
            .post(&self.config.toxicity_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ToxicityError::Transport(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| ToxicityError::Transport(e.to_string()))?;

        parse_toxicity_body(&body)
    }
}
