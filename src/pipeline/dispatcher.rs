//! Dispatch worker for the command pipeline
//!
//! One submission at a time flows through: classify, then for unknown input
//! a chat-completion call, then a toxicity check of the reply. The worker
//! owns a thread with its own tokio runtime; the UI talks to it through a
//! handle over crossbeam channels and reads results from shared session
//! state. The two remote calls fail independently: a toxicity failure never
//! touches the reply already on screen.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::commands::{classify, ClassificationResult};
use crate::inference::{InferenceService, ToxicityVerdict};
use crate::session::{SharedSessionState, SubmissionOutcome};
use crate::{QuipError, Result};

/// User message shown when the submitted command is empty.
const EMPTY_INPUT_MESSAGE: &str = "Please enter a command.";
/// Placeholder shown while the chat call is in flight.
const THINKING_MESSAGE: &str = "Thinking... 🤖";

/// Commands sent to the dispatch worker
#[derive(Clone, Debug)]
pub enum DispatchCommand {
    /// Process one submitted command
    Submit(String),
    /// Shutdown the worker
    Shutdown,
}

/// Events emitted by the dispatch worker
///
/// State is written before the matching event is sent, so a consumer that
/// receives an event can read the session state and see the result.
#[derive(Clone, Debug)]
pub enum DispatchEvent {
    /// Input was empty; no network call was made
    ValidationFailed {
        /// User-facing message
        message: String,
    },
    /// A canonical phrase matched
    Responded {
        /// Canned response now on screen
        response: String,
        /// The phrase that matched (playback trigger key)
        matched_phrase: String,
    },
    /// Unknown command, chat call issued
    InferenceStarted,
    /// Chat call succeeded and the reply is on screen
    InferenceComplete {
        /// The reply text
        reply: String,
    },
    /// Chat call failed; toxicity was skipped
    InferenceFailed {
        /// User-facing error message
        message: String,
    },
    /// Toxicity verdict received for the displayed reply
    ToxicityChecked {
        /// The verdict
        verdict: ToxicityVerdict,
    },
    /// Toxicity call failed; the displayed reply is unaffected
    ToxicityFailed {
        /// Log-facing error message
        message: String,
    },
    /// Worker shut down
    Shutdown,
}

/// Handle for interacting with a running dispatch worker
pub struct DispatcherHandle {
    command_tx: Sender<DispatchCommand>,
    event_rx: Receiver<DispatchEvent>,
    state: SharedSessionState,
    worker_handle: Option<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// Submit a command for processing
    ///
    /// Refuses with `QuipError::PipelineBusy` while a previous submission is
    /// still in flight; the pipeline handles exactly one at a time. The busy
    /// phase is entered here, synchronously, so a caller that checks after a
    /// successful submit always observes it.
    pub fn submit(&self, text: impl Into<String>) -> Result<()> {
        {
            let mut state = self.state.write();
            if state.is_busy() {
                return Err(QuipError::PipelineBusy);
            }
            state.begin_submission();
        }

        if let Err(e) = self
            .command_tx
            .send(DispatchCommand::Submit(text.into()))
        {
            // Worker is gone; release the phase so the UI does not stay stuck
            self.state.write().abort_submission();
            return Err(QuipError::ChannelError(format!(
                "Failed to send submission: {}",
                e
            )));
        }

        Ok(())
    }

    /// Shutdown the worker and wait for it to finish
    pub fn shutdown(mut self) -> Result<()> {
        let _ = self.command_tx.send(DispatchCommand::Shutdown);
        if let Some(handle) = self.worker_handle.take() {
            handle
                .join()
                .map_err(|_| QuipError::ChannelError("Worker thread panicked".to_string()))?;
        }
        Ok(())
    }

    /// Try to receive an event without blocking
    pub fn try_recv_event(&self) -> Option<DispatchEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event, blocking until available
    pub fn recv_event(&self) -> Result<DispatchEvent> {
        self.event_rx
            .recv()
            .map_err(|e| QuipError::ChannelError(format!("Failed to receive event: {}", e)))
    }

    /// Receive an event with a timeout
    pub fn recv_event_timeout(&self, timeout: Duration) -> Result<DispatchEvent> {
        self.event_rx
            .recv_timeout(timeout)
            .map_err(|e| QuipError::ChannelError(format!("Failed to receive event: {}", e)))
    }

    /// Get the shared session state
    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }

    /// Check if a submission is being processed
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }
}

/// Dispatcher that spawns the worker thread
pub struct Dispatcher {
    service: Arc<dyn InferenceService>,
    state: SharedSessionState,
}

impl Dispatcher {
    /// Create a dispatcher around an inference service
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self {
            service,
            state: SharedSessionState::new(),
        }
    }

    /// Start the dispatch worker thread
    ///
    /// Returns a handle for submitting commands and receiving events. The
    /// worker runs in a separate thread with its own tokio runtime.
    pub fn start_worker(self) -> Result<DispatcherHandle> {
        let (command_tx, command_rx) = bounded::<DispatchCommand>(100);
        let (event_tx, event_rx) = bounded::<DispatchEvent>(100);

        let state = self.state.clone();
        let worker_state = self.state;
        let service = self.service;

        let worker_handle = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    let _ = event_tx.send(DispatchEvent::Shutdown);
                    return;
                }
            };

            runtime.block_on(async move {
                worker_loop(service, worker_state, command_rx, event_tx).await;
            });
        });

        Ok(DispatcherHandle {
            command_tx,
            event_rx,
            state,
            worker_handle: Some(worker_handle),
        })
    }
}

/// Main worker loop handling submissions one at a time
async fn worker_loop(
    service: Arc<dyn InferenceService>,
    state: SharedSessionState,
    command_rx: Receiver<DispatchCommand>,
    event_tx: Sender<DispatchEvent>,
) {
    info!("Dispatch worker starting");

    loop {
        let command = match command_rx.recv() {
            Ok(cmd) => cmd,
            Err(_) => {
                info!("Command channel closed, shutting down");
                break;
            }
        };

        match command {
            DispatchCommand::Submit(text) => {
                debug!("Processing submission: '{}'", text);
                if !process_submission(&*service, &state, &event_tx, &text).await {
                    error!("Event channel closed");
                    break;
                }
            }

            DispatchCommand::Shutdown => {
                info!("Dispatch worker received shutdown command");
                break;
            }
        }
    }

    let _ = event_tx.send(DispatchEvent::Shutdown);
    info!("Dispatch worker shutdown complete");
}

/// Run one submission through classify → infer → analyze_toxicity
///
/// Returns false if the event channel closed.
async fn process_submission(
    service: &dyn InferenceService,
    state: &SharedSessionState,
    event_tx: &Sender<DispatchEvent>,
    text: &str,
) -> bool {
    match classify(text) {
        ClassificationResult::Empty => {
            warn!("Empty input received");
            {
                let mut s = state.write();
                s.response_text = EMPTY_INPUT_MESSAGE.to_string();
                s.append_log("❗ Empty input received");
                s.finish(SubmissionOutcome::ValidationError);
            }
            event_tx
                .send(DispatchEvent::ValidationFailed {
                    message: EMPTY_INPUT_MESSAGE.to_string(),
                })
                .is_ok()
        }

        ClassificationResult::Matched {
            response,
            matched_phrase,
        } => {
            info!("Matched canonical phrase '{}'", matched_phrase);
            {
                let mut s = state.write();
                s.response_text = response.clone();
                s.append_log(format!("🗣️ {} → 💬 {}", text, response));
                s.finish(SubmissionOutcome::Responded);
            }
            event_tx
                .send(DispatchEvent::Responded {
                    response,
                    matched_phrase,
                })
                .is_ok()
        }

        ClassificationResult::Unmatched { normalized_input } => {
            info!("No phrase matched, calling LLM");
            {
                let mut s = state.write();
                s.start_inference();
                s.response_text = THINKING_MESSAGE.to_string();
                s.append_log(format!("🗣️ {} → ⌛ Calling LLM...", text));
            }
            if event_tx.send(DispatchEvent::InferenceStarted).is_err() {
                return false;
            }

            run_inference_leg(service, state, event_tx, &normalized_input).await
        }
    }
}

/// Run the two chained remote calls for an unmatched submission
async fn run_inference_leg(
    service: &dyn InferenceService,
    state: &SharedSessionState,
    event_tx: &Sender<DispatchEvent>,
    prompt: &str,
) -> bool {
    let reply = match service.infer(prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Inference failed: {}", e);
            let message = format!("❌ LLM Error: {}", e);
            {
                let mut s = state.write();
                s.response_text = message.clone();
                s.append_log(format!("LLM Error: {}", e));
                s.finish(SubmissionOutcome::InferenceFailed);
            }
            return event_tx
                .send(DispatchEvent::InferenceFailed { message })
                .is_ok();
        }
    };

    info!("Inference reply received ({} chars)", reply.len());
    {
        let mut s = state.write();
        s.response_text = reply.clone();
        s.append_log(format!("💡 LLM: {}", reply));
        s.start_toxicity_check();
    }
    if event_tx
        .send(DispatchEvent::InferenceComplete {
            reply: reply.clone(),
        })
        .is_err()
    {
        return false;
    }

    // Advisory only: whatever happens here, the reply stays on screen.
    match service.analyze_toxicity(&reply).await {
        Ok(verdict) => {
            debug!("Toxicity verdict: {:?}", verdict);
            {
                let mut s = state.write();
                s.append_log(toxicity_log_line(&verdict));
                s.finish(SubmissionOutcome::Done);
            }
            event_tx
                .send(DispatchEvent::ToxicityChecked { verdict })
                .is_ok()
        }
        Err(e) => {
            warn!("Toxicity check failed: {}", e);
            let message = e.to_string();
            {
                let mut s = state.write();
                s.append_log(format!("⚠️ Toxicity check failed: {}", message));
                s.finish(SubmissionOutcome::Done);
            }
            event_tx
                .send(DispatchEvent::ToxicityFailed { message })
                .is_ok()
        }
    }
}

/// Format the activity-log line for a toxicity verdict
fn toxicity_log_line(verdict: &ToxicityVerdict) -> String {
    format!(
        "🧪 Toxicity: {:.3} | {}",
        verdict.score,
        if verdict.is_toxic { "🚨 TOXIC" } else { "✅ Clean" }
    )
}
