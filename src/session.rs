//! Session state for the Quip assistant
//!
//! One logical session owns the displayed response, the append-only activity
//! log, and the phase of the submission currently in flight. The state is
//! written by the dispatch worker and read by the UI, so it lives behind a
//! `SharedSessionState` the same way the rest of the app shares data:
//! `Arc<RwLock>` with cheap snapshots.

use parking_lot::RwLock;
use std::sync::Arc;

/// Greeting shown before the first submission.
pub const GREETING: &str = "Hi! I'm Quip. What can I do for you?";

/// Phase of the submission currently in flight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// No submission in flight
    #[default]
    Idle,
    /// Input received, classification running
    Classifying,
    /// Classified as unknown, chat call in flight
    AwaitingInference,
    /// Reply displayed, toxicity call in flight
    AwaitingToxicity,
}

impl SubmissionPhase {
    /// Check if no submission is in flight
    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionPhase::Idle)
    }

    /// Check if a submission is being processed
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

impl std::fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionPhase::Idle => write!(f, "Idle"),
            SubmissionPhase::Classifying => write!(f, "Classifying"),
            SubmissionPhase::AwaitingInference => write!(f, "AwaitingInference"),
            SubmissionPhase::AwaitingToxicity => write!(f, "AwaitingToxicity"),
        }
    }
}

/// Terminal outcome of the most recent submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Input was empty; recovered locally with a user message
    ValidationError,
    /// A canonical phrase matched and its canned response was shown
    Responded,
    /// The chat call failed; toxicity was skipped
    InferenceFailed,
    /// Inference reply shown and toxicity step finished (or failed softly)
    Done,
}

/// State of the single active session
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Phase of the in-flight submission
    pub phase: SubmissionPhase,
    /// Outcome of the last finished submission
    pub last_outcome: Option<SubmissionOutcome>,
    /// Text currently shown in the response area
    pub response_text: String,
    /// Append-only activity log, oldest first
    pub log: Vec<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            last_outcome: None,
            response_text: GREETING.to_string(),
            log: Vec::new(),
        }
    }
}

impl SessionState {
    /// Create a fresh session state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a submission is being processed
    pub fn is_busy(&self) -> bool {
        self.phase.is_active()
    }

    /// Append a line to the activity log
    pub fn append_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    // === State transitions ===

    /// Accept a new submission for processing
    pub fn begin_submission(&mut self) {
        self.phase = SubmissionPhase::Classifying;
        self.last_outcome = None;
    }

    /// Enter the inference leg of the pipeline
    pub fn start_inference(&mut self) {
        self.phase = SubmissionPhase::AwaitingInference;
    }

    /// Inference reply is on screen, toxicity check starting
    pub fn start_toxicity_check(&mut self) {
        self.phase = SubmissionPhase::AwaitingToxicity;
    }

    /// Finish the in-flight submission with a terminal outcome
    pub fn finish(&mut self, outcome: SubmissionOutcome) {
        self.phase = SubmissionPhase::Idle;
        self.last_outcome = Some(outcome);
    }

    /// Drop the in-flight submission without recording an outcome
    ///
    /// Used when a submission was accepted but could not be handed to the
    /// worker.
    pub fn abort_submission(&mut self) {
        self.phase = SubmissionPhase::Idle;
    }
}

/// Thread-safe shared session state
#[derive(Clone, Default)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSessionState {
    /// Create a new shared state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a read lock on the state
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    /// Get a write lock on the state
    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, SessionState> {
        self.inner.write()
    }

    /// Get a snapshot of the current state (no lock held after return)
    pub fn snapshot(&self) -> SessionState {
        self.inner.read().clone()
    }

    /// Check if a submission is being processed
    pub fn is_busy(&self) -> bool {
        self.inner.read().is_busy()
    }

    /// Get the currently displayed response text
    pub fn response_text(&self) -> String {
        self.inner.read().response_text.clone()
    }

    /// Get the outcome of the last finished submission
    pub fn last_outcome(&self) -> Option<SubmissionOutcome> {
        self.inner.read().last_outcome
    }
}
