//! Configuration for the remote inference client

use tracing::warn;

/// Environment variable holding the chat endpoint bearer token.
pub const API_KEY_ENV: &str = "QUIP_API_KEY";
/// Environment variable overriding the chat-completions URL.
pub const CHAT_URL_ENV: &str = "QUIP_CHAT_URL";
/// Environment variable overriding the toxicity-analysis URL.
pub const TOXICITY_URL_ENV: &str = "QUIP_TOXICITY_URL";

/// Configuration for the inference endpoints
#[derive(Clone, Debug)]
pub struct InferenceConfig {
    /// Chat-completions endpoint URL
    pub chat_url: String,
    /// Bearer token for the chat endpoint
    pub api_key: String,
    /// Model identifier sent with each chat request
    pub model: String,
    /// System persona prepended to every conversation
    pub persona: String,
    /// Toxicity-analysis endpoint URL
    pub toxicity_url: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            chat_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            persona: "You are a helpful assistant.".to_string(),
            toxicity_url: "http://127.0.0.1:8000/analyze-toxicity".to_string(),
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with default endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from the environment
    ///
    /// Falls back to compiled-in defaults for anything unset. A missing API
    /// key is allowed here; the chat endpoint will reject the request at
    /// call time instead.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => config.api_key = key,
            _ => warn!("{} not set; chat requests will be unauthorized", API_KEY_ENV),
        }
        if let Ok(url) = std::env::var(CHAT_URL_ENV) {
            if !url.is_empty() {
                config.chat_url = url;
            }
        }
        if let Ok(url) = std::env::var(TOXICITY_URL_ENV) {
            if !url.is_empty() {
                config.toxicity_url = url;
            }
        }

        config
    }

    /// Set the chat endpoint URL
    pub fn with_chat_url(mut self, url: impl Into<String>) -> Self {
        self.chat_url = url.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system persona
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Set the toxicity endpoint URL
    pub fn with_toxicity_url(mut self, url: impl Into<String>) -> Self {
        self.toxicity_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = InferenceConfig::default();
        assert!(config.chat_url.ends_with("/chat/completions"));
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert!(config.api_key.is_empty());
        assert!(config.toxicity_url.ends_with("/analyze-toxicity"));
    }

    #[test]
    fn test_config_builder() {
        let config = InferenceConfig::new()
            .with_chat_url("http://localhost:9999/v1/chat/completions")
            .with_api_key("test-key")
            .with_model("test-model")
            .with_persona("You are a test double.")
            .with_toxicity_url("http://localhost:9998/analyze-toxicity");

        assert_eq!(config.chat_url, "http://localhost:9999/v1/chat/completions");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.persona, "You are a test double.");
        assert_eq!(config.toxicity_url, "http://localhost:9998/analyze-toxicity");
    }
}
