//! Error types for the Quip application
//!
//! The inference client defines its own per-endpoint error enums
//! (`InferError`, `ToxicityError`); this module covers the application
//! plumbing around them.

use thiserror::Error;

/// Quip application errors
#[derive(Error, Debug, Clone)]
pub enum QuipError {
    /// Channel communication error
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// A submission is already being processed
    #[error("A command is already in flight")]
    PipelineBusy,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl QuipError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors allow the application to continue running,
    /// while non-recoverable errors may require user intervention or restart.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Channel errors indicate internal issues
            QuipError::ChannelError(_) => false,
            // Busy pipeline clears itself once the submission finishes
            QuipError::PipelineBusy => true,
            // Config errors require user intervention
            QuipError::ConfigError(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    ///
    /// Returns a message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            QuipError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            QuipError::PipelineBusy => {
                "Still working on the previous command. One moment...".to_string()
            }
            QuipError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
        }
    }
}

/// Result type alias for Quip operations
pub type Result<T> = std::result::Result<T, QuipError>;
