//! Remote inference client
//!
//! Two independent operations against two endpoints: a chat-completion call
//! that produces the assistant's reply, and a follow-up toxicity analysis of
//! that reply. They are chained by the dispatch pipeline but fail
//! independently.

pub mod client;
pub mod config;
pub mod wire;

pub use client::{HttpInferenceClient, InferError, InferenceService, ToxicityError};
pub use config::InferenceConfig;
pub use wire::{
    ChatMessage, ChatRequest, ChatResponse, ToxicityRequest, ToxicityVerdict, NO_RESPONSE_FALLBACK,
};
