//! Quip - A pocket voice-assistant demo
//!
//! Quip accepts typed or button-triggered commands, matches them against a
//! small table of canonical phrases, and falls back to a remote LLM call
//! plus a follow-up toxicity check when nothing matches.

pub mod commands;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod playback;
pub mod session;
pub mod ui;

// Re-export error types
pub use error::{QuipError, Result};

// Re-export the pipeline surface
pub use commands::{classify, ClassificationResult, PHRASE_TABLE, PLAY_MUSIC_PHRASE};
pub use inference::{
    HttpInferenceClient, InferError, InferenceConfig, InferenceService, ToxicityError,
    ToxicityVerdict,
};
pub use pipeline::{DispatchEvent, Dispatcher, DispatcherHandle};
pub use session::{SessionState, SharedSessionState, SubmissionOutcome, SubmissionPhase};
