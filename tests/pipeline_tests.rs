//! Integration tests for the command-dispatch pipeline
//!
//! These tests run the dispatch worker end-to-end against deterministic
//! stub inference services. No network is involved.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use quip::inference::{InferError, InferenceService, ToxicityError, ToxicityVerdict};
use quip::pipeline::{DispatchEvent, Dispatcher, DispatcherHandle};
use quip::session::SubmissionOutcome;
use quip::QuipError;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Deterministic inference double with call counters
struct StubService {
    infer_result: Result<String, InferError>,
    toxicity_result: Result<ToxicityVerdict, ToxicityError>,
    /// Artificial latency for the chat call, for busy-guard tests
    infer_delay: Duration,
    infer_calls: AtomicUsize,
    toxicity_calls: AtomicUsize,
}

impl StubService {
    fn new(
        infer_result: Result<String, InferError>,
        toxicity_result: Result<ToxicityVerdict, ToxicityError>,
    ) -> Arc<Self> {
        Arc::new(Self {
            infer_result,
            toxicity_result,
            infer_delay: Duration::ZERO,
            infer_calls: AtomicUsize::new(0),
            toxicity_calls: AtomicUsize::new(0),
        })
    }

    fn with_delay(
        infer_result: Result<String, InferError>,
        toxicity_result: Result<ToxicityVerdict, ToxicityError>,
        infer_delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            infer_result,
            toxicity_result,
            infer_delay,
            infer_calls: AtomicUsize::new(0),
            toxicity_calls: AtomicUsize::new(0),
        })
    }

    fn infer_calls(&self) -> usize {
        self.infer_calls.load(Ordering::SeqCst)
    }

    fn toxicity_calls(&self) -> usize {
        self.toxicity_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceService for StubService {
    async fn infer(&self, _prompt: &str) -> Result<String, InferError> {
        self.infer_calls.fetch_add(1, Ordering::SeqCst);
        if !self.infer_delay.is_zero() {
            tokio::time::sleep(self.infer_delay).await;
        }
        self.infer_result.clone()
    }

    async fn analyze_toxicity(&self, _text: &str) -> Result<ToxicityVerdict, ToxicityError> {
        self.toxicity_calls.fetch_add(1, Ordering::SeqCst);
        self.toxicity_result.clone()
    }
}

fn clean_verdict() -> ToxicityVerdict {
    ToxicityVerdict {
        is_toxic: false,
        score: 0.01,
    }
}

fn start(service: Arc<StubService>) -> DispatcherHandle {
    Dispatcher::new(service).start_worker().unwrap()
}

fn next_event(handle: &DispatcherHandle) -> DispatchEvent {
    handle.recv_event_timeout(EVENT_TIMEOUT).unwrap()
}

#[test]
fn test_matched_command_issues_no_network_calls() {
    let service = StubService::new(Ok("unused".to_string()), Ok(clean_verdict()));
    let handle = start(service.clone());

    handle.submit("call mom").unwrap();

    match next_event(&handle) {
        DispatchEvent::Responded {
            response,
            matched_phrase,
        } => {
            assert_eq!(response, "📞 Calling Mom...");
            assert_eq!(matched_phrase, "call mom");
        }
        other => panic!("Expected Responded event, got {:?}", other),
    }

    let snapshot = handle.state().snapshot();
    assert_eq!(snapshot.response_text, "📞 Calling Mom...");
    assert_eq!(snapshot.last_outcome, Some(SubmissionOutcome::Responded));
    assert!(!snapshot.is_busy());

    assert_eq!(service.infer_calls(), 0);
    assert_eq!(service.toxicity_calls(), 0);

    handle.shutdown().unwrap();
}

#[test]
fn test_matching_is_trimmed_and_case_insensitive() {
    let service = StubService::new(Ok("unused".to_string()), Ok(clean_verdict()));
    let handle = start(service.clone());

    handle.submit("   CALL MOM   ").unwrap();

    match next_event(&handle) {
        DispatchEvent::Responded { matched_phrase, .. } => {
            assert_eq!(matched_phrase, "call mom");
        }
        other => panic!("Expected Responded event, got {:?}", other),
    }
    assert_eq!(service.infer_calls(), 0);

    handle.shutdown().unwrap();
}

#[test]
fn test_empty_input_is_rejected_locally() {
    let service = StubService::new(Ok("unused".to_string()), Ok(clean_verdict()));
    let handle = start(service.clone());

    handle.submit("   ").unwrap();

    match next_event(&handle) {
        DispatchEvent::ValidationFailed { message } => {
            assert_eq!(message, "Please enter a command.");
        }
        other => panic!("Expected ValidationFailed event, got {:?}", other),
    }

    let snapshot = handle.state().snapshot();
    assert_eq!(snapshot.response_text, "Please enter a command.");
    assert_eq!(
        snapshot.last_outcome,
        Some(SubmissionOutcome::ValidationError)
    );
    assert!(snapshot
        .log
        .iter()
        .any(|line| line.contains("Empty input received")));

    assert_eq!(service.infer_calls(), 0);
    assert_eq!(service.toxicity_calls(), 0);

    handle.shutdown().unwrap();
}

#[test]
fn test_unmatched_command_runs_inference_then_toxicity() {
    let service = StubService::new(Ok("sure, brewing".to_string()), Ok(clean_verdict()));
    let handle = start(service.clone());

    handle.submit("make coffee").unwrap();

    assert!(matches!(next_event(&handle), DispatchEvent::InferenceStarted));

    match next_event(&handle) {
        DispatchEvent::InferenceComplete { reply } => assert_eq!(reply, "sure, brewing"),
        other => panic!("Expected InferenceComplete event, got {:?}", other),
    }
    // The reply is already on screen before the toxicity verdict lands
    assert_eq!(handle.state().response_text(), "sure, brewing");

    match next_event(&handle) {
        DispatchEvent::ToxicityChecked { verdict } => {
            assert!(!verdict.is_toxic);
            assert_eq!(verdict.score, 0.01);
        }
        other => panic!("Expected ToxicityChecked event, got {:?}", other),
    }

    let snapshot = handle.state().snapshot();
    assert_eq!(snapshot.response_text, "sure, brewing");
    assert_eq!(snapshot.last_outcome, Some(SubmissionOutcome::Done));
    assert!(snapshot.log.iter().any(|line| line.contains("✅ Clean")));

    assert_eq!(service.infer_calls(), 1);
    assert_eq!(service.toxicity_calls(), 1);

    handle.shutdown().unwrap();
}

#[test]
fn test_toxic_verdict_is_logged() {
    let service = StubService::new(
        Ok("something rude".to_string()),
        Ok(ToxicityVerdict {
            is_toxic: true,
            score: 0.87,
        }),
    );
    let handle = start(service);

    handle.submit("make coffee").unwrap();

    assert!(matches!(next_event(&handle), DispatchEvent::InferenceStarted));
    assert!(matches!(
        next_event(&handle),
        DispatchEvent::InferenceComplete { .. }
    ));
    match next_event(&handle) {
        DispatchEvent::ToxicityChecked { verdict } => assert!(verdict.is_toxic),
        other => panic!("Expected ToxicityChecked event, got {:?}", other),
    }

    let snapshot = handle.state().snapshot();
    // A toxic verdict is advisory: the reply stays on screen
    assert_eq!(snapshot.response_text, "something rude");
    assert!(snapshot
        .log
        .iter()
        .any(|line| line.contains("🚨 TOXIC") && line.contains("0.870")));

    handle.shutdown().unwrap();
}

#[test]
fn test_transport_failure_skips_toxicity() {
    let service = StubService::new(
        Err(InferError::Transport("connection refused".to_string())),
        Ok(clean_verdict()),
    );
    let handle = start(service.clone());

    handle.submit("make coffee").unwrap();

    assert!(matches!(next_event(&handle), DispatchEvent::InferenceStarted));
    match next_event(&handle) {
        DispatchEvent::InferenceFailed { message } => {
            assert!(message.starts_with("❌ LLM Error:"));
        }
        other => panic!("Expected InferenceFailed event, got {:?}", other),
    }

    let snapshot = handle.state().snapshot();
    assert!(snapshot.response_text.starts_with("❌ LLM Error:"));
    assert_eq!(
        snapshot.last_outcome,
        Some(SubmissionOutcome::InferenceFailed)
    );
    assert!(!snapshot.is_busy());

    assert_eq!(service.infer_calls(), 1);
    assert_eq!(service.toxicity_calls(), 0);

    handle.shutdown().unwrap();
}

#[test]
fn test_toxicity_failure_does_not_touch_displayed_reply() {
    let service = StubService::new(
        Ok("sure, brewing".to_string()),
        Err(ToxicityError::Malformed),
    );
    let handle = start(service.clone());

    handle.submit("make coffee").unwrap();

    assert!(matches!(next_event(&handle), DispatchEvent::InferenceStarted));
    assert!(matches!(
        next_event(&handle),
        DispatchEvent::InferenceComplete { .. }
    ));
    assert!(matches!(
        next_event(&handle),
        DispatchEvent::ToxicityFailed { .. }
    ));

    let snapshot = handle.state().snapshot();
    assert_eq!(snapshot.response_text, "sure, brewing");
    assert_eq!(snapshot.last_outcome, Some(SubmissionOutcome::Done));
    assert!(snapshot
        .log
        .iter()
        .any(|line| line.contains("⚠️ Toxicity check failed")));

    assert_eq!(service.toxicity_calls(), 1);

    handle.shutdown().unwrap();
}

#[test]
fn test_second_submission_refused_while_in_flight() {
    let service = StubService::with_delay(
        Ok("slow reply".to_string()),
        Ok(clean_verdict()),
        Duration::from_millis(300),
    );
    let handle = start(service.clone());

    handle.submit("make coffee").unwrap();
    assert!(matches!(next_event(&handle), DispatchEvent::InferenceStarted));

    // Pipeline is mid-inference now
    assert!(handle.is_busy());
    match handle.submit("call mom") {
        Err(QuipError::PipelineBusy) => {}
        other => panic!("Expected PipelineBusy, got {:?}", other),
    }

    // Drain the rest of the first submission
    assert!(matches!(
        next_event(&handle),
        DispatchEvent::InferenceComplete { .. }
    ));
    assert!(matches!(
        next_event(&handle),
        DispatchEvent::ToxicityChecked { .. }
    ));

    // Only the first submission reached the service
    assert_eq!(service.infer_calls(), 1);

    // And the pipeline accepts submissions again
    assert!(!handle.is_busy());
    handle.submit("call mom").unwrap();
    assert!(matches!(next_event(&handle), DispatchEvent::Responded { .. }));

    handle.shutdown().unwrap();
}

#[test]
fn test_shutdown_joins_cleanly() {
    let service = StubService::new(Ok("unused".to_string()), Ok(clean_verdict()));
    let handle = start(service);

    handle.submit("call mom").unwrap();
    assert!(matches!(next_event(&handle), DispatchEvent::Responded { .. }));

    handle.shutdown().unwrap();
}

#[test]
fn test_zero_choice_fallback_flows_to_display() {
    use quip::inference::NO_RESPONSE_FALLBACK;

    // A stub that returns the client-level fallback, as the HTTP client does
    // for a zero-choice body
    let service = StubService::new(Ok(NO_RESPONSE_FALLBACK.to_string()), Ok(clean_verdict()));
    let handle = start(service);

    handle.submit("make coffee").unwrap();

    assert!(matches!(next_event(&handle), DispatchEvent::InferenceStarted));
    match next_event(&handle) {
        DispatchEvent::InferenceComplete { reply } => {
            assert_eq!(reply, NO_RESPONSE_FALLBACK);
        }
        other => panic!("Expected InferenceComplete event, got {:?}", other),
    }

    assert_eq!(handle.state().response_text(), NO_RESPONSE_FALLBACK);

    assert!(matches!(
        next_event(&handle),
        DispatchEvent::ToxicityChecked { .. }
    ));

    handle.shutdown().unwrap();
}
