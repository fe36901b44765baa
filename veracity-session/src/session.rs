//! The orchestrator itself: one in-flight request, a cosmetic stage timer,
//! and stale-response suppression.
//!
//! Concurrency model: every transition happens under one mutex and runs to
//! completion. The network call and the stage timer are the only spawned
//! activities; both capture the generation current at submit time and
//! self-discard the moment it no longer matches. The timer is tied to a
//! per-flight cancellation token that is cancelled on every exit from
//! `Loading` — settle, reset, or teardown — so it can never tick past the
//! end of its request.

use crate::state::{ClaimInput, InputMode, RequestState, MAX_STAGE};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use veracity_api::{ClaimPayload, VerificationReport, VerificationService};
use veracity_common::VeracityConfig;

/// User-facing message for any transport-level failure. Deliberately
/// generic: connection refusals, timeouts, bad status codes, and
/// undecodable bodies all look the same to the person retrying.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Connection error. Please verify the verification service is running.";

struct SessionState {
    mode: InputMode,
    input: ClaimInput,
    request: RequestState,
    /// Token owned by the current flight; present exactly while `Loading`.
    flight: Option<CancellationToken>,
}

/// Client-side orchestrator for one verification view.
///
/// Lives exactly as long as the view it backs; dropping it releases the
/// stage timer and marks any pending response stale. Must be used from
/// within a tokio runtime since [`VerifySession::submit`] spawns tasks.
pub struct VerifySession {
    service: Arc<dyn VerificationService>,
    state: Arc<Mutex<SessionState>>,
    updates: watch::Sender<RequestState>,
    generation: Arc<AtomicU64>,
    cancel: CancellationToken,
    stage_interval: Duration,
}

impl VerifySession {
    pub fn new(
        service: Arc<dyn VerificationService>,
        mode: InputMode,
        stage_interval: Duration,
    ) -> Self {
        let (updates, _) = watch::channel(RequestState::Idle);
        Self {
            service,
            state: Arc::new(Mutex::new(SessionState {
                mode,
                input: ClaimInput::default(),
                request: RequestState::Idle,
                flight: None,
            })),
            updates,
            generation: Arc::new(AtomicU64::new(0)),
            cancel: CancellationToken::new(),
            stage_interval,
        }
    }

    /// Convenience constructor taking settings from the shared config.
    pub fn with_config(service: Arc<dyn VerificationService>, config: &VeracityConfig) -> Self {
        Self::new(
            service,
            config.default_mode,
            Duration::from_millis(config.stage_interval_ms),
        )
    }

    // ---- presentation contract: reads ----

    pub fn mode(&self) -> InputMode {
        lock(&self.state).mode
    }

    pub fn input(&self) -> ClaimInput {
        lock(&self.state).input.clone()
    }

    /// Snapshot of the request lifecycle at this instant.
    pub fn request(&self) -> RequestState {
        lock(&self.state).request.clone()
    }

    /// Subscribe to lifecycle transitions. The receiver starts at the
    /// current state and observes every transition thereafter.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.updates.subscribe()
    }

    // ---- presentation contract: mutations ----

    /// Switch input mode. Legal at any time, including mid-flight; it only
    /// affects the next submission. Neither input field is cleared.
    pub fn set_mode(&self, mode: InputMode) {
        lock(&self.state).mode = mode;
    }

    /// Plain assignment; validation is deferred to [`VerifySession::submit`].
    pub fn set_title(&self, value: impl Into<String>) {
        lock(&self.state).input.title = value.into();
    }

    pub fn set_body(&self, value: impl Into<String>) {
        lock(&self.state).input.body = value.into();
    }

    /// Submit the current input for verification.
    ///
    /// No-op when both fields are blank (soft ignore) or when a request is
    /// already in flight. Otherwise transitions to `Loading`, spawns the
    /// stage timer, and issues exactly one service call.
    pub fn submit(&self) {
        let (payload, generation, flight) = {
            let mut st = lock(&self.state);
            if st.request.is_loading() {
                tracing::debug!("submit rejected: request already in flight");
                return;
            }
            if st.input.is_blank() {
                tracing::debug!("submit ignored: nothing to verify");
                return;
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let flight = self.cancel.child_token();
            st.flight = Some(flight.clone());
            st.request = RequestState::Loading {
                stage: 0,
                started_at: Instant::now(),
            };
            self.updates.send_replace(st.request.clone());

            let payload = ClaimPayload {
                title: st.input.title.clone(),
                text: st.input.body.clone(),
            };
            (payload, generation, flight)
        };

        tracing::info!(generation, "verification submitted");
        self.spawn_stage_timer(generation, flight);
        self.spawn_request(payload, generation);
    }

    /// Return to `Idle`, keeping the user's input for a retry or edit.
    ///
    /// From `Loading` this doubles as cancellation: the timer is released
    /// and the eventual response discarded.
    pub fn reset(&self) {
        let mut st = lock(&self.state);
        if matches!(st.request, RequestState::Idle) {
            return;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(flight) = st.flight.take() {
            flight.cancel();
        }
        st.request = RequestState::Idle;
        self.updates.send_replace(RequestState::Idle);
    }

    /// Tear the session down: stop the stage timer and mark any pending
    /// response stale. The underlying transport call is not aborted; its
    /// result is simply never applied. Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        // Cancelling the root token cancels every flight token derived
        // from it, releasing the timer.
        self.cancel.cancel();
    }

    // ---- spawned activities ----

    fn spawn_request(&self, payload: ClaimPayload, generation: u64) {
        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let current_gen = Arc::clone(&self.generation);
        let updates = self.updates.clone();

        tokio::spawn(async move {
            let next = match service.predict(&payload).await {
                Err(err) => {
                    tracing::warn!(error = %err, generation, "verification transport failed");
                    RequestState::Failed {
                        message: TRANSPORT_FAILURE_MESSAGE.to_string(),
                    }
                }
                Ok(raw) => match VerificationReport::from_raw(raw) {
                    Ok(report) => RequestState::Succeeded { report },
                    Err(reported) => {
                        tracing::warn!(error = %reported, generation, "service reported a failure");
                        RequestState::Failed {
                            message: reported.0,
                        }
                    }
                },
            };

            let mut st = lock(&state);
            if current_gen.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "discarding stale verification response");
                return;
            }
            if let Some(flight) = st.flight.take() {
                flight.cancel();
            }
            st.request = next;
            updates.send_replace(st.request.clone());
        });
    }

    fn spawn_stage_timer(&self, generation: u64, flight: CancellationToken) {
        let state = Arc::clone(&self.state);
        let current_gen = Arc::clone(&self.generation);
        let updates = self.updates.clone();
        let interval = self.stage_interval;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = flight.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                let mut st = lock(&state);
                if current_gen.load(Ordering::SeqCst) != generation {
                    break;
                }
                match &mut st.request {
                    RequestState::Loading { stage, .. } if *stage < MAX_STAGE => {
                        *stage += 1;
                        updates.send_replace(st.request.clone());
                    }
                    // Hold at the last stage until the request settles.
                    RequestState::Loading { .. } => {}
                    _ => break,
                }
            }
        });
    }
}

impl Drop for VerifySession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;
    use veracity_api::{ApiError, RawVerdict, ServiceHealth};

    enum Behavior {
        Respond(RawVerdict),
        FailTransport,
        /// Fail the first call, answer the second. Exercises the
        /// reset-and-retry path.
        FailThenRespond(RawVerdict),
        /// Never answer.
        Hang,
        /// Answer once released via the notify handle.
        RespondWhenReleased(Arc<Notify>, RawVerdict),
    }

    struct FakeService {
        calls: AtomicUsize,
        behavior: Behavior,
    }

    impl FakeService {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                behavior,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VerificationService for FakeService {
        async fn predict(&self, _claim: &ClaimPayload) -> Result<RawVerdict, ApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match &self.behavior {
                Behavior::Respond(raw) => Ok(raw.clone()),
                Behavior::FailTransport => Err(ApiError::Network("connection refused".into())),
                Behavior::FailThenRespond(raw) => {
                    if call == 1 {
                        Err(ApiError::Network("connection refused".into()))
                    } else {
                        Ok(raw.clone())
                    }
                }
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                Behavior::RespondWhenReleased(gate, raw) => {
                    gate.notified().await;
                    Ok(raw.clone())
                }
            }
        }

        async fn health_check(&self) -> Result<ServiceHealth, ApiError> {
            Ok(ServiceHealth::default())
        }
    }

    fn real_verdict() -> RawVerdict {
        serde_json::from_str(
            r#"{"verdict":"REAL","confidence":132,"style_analysis":"REAL",
                "sources":["https://x.com/y","not-a-url"]}"#,
        )
        .unwrap()
    }

    fn session(service: Arc<FakeService>) -> VerifySession {
        VerifySession::new(service, InputMode::Url, Duration::from_secs(1))
    }

    async fn settle(rx: &mut watch::Receiver<RequestState>) -> RequestState {
        loop {
            let current = rx.borrow_and_update().clone();
            if current.is_settled() {
                return current;
            }
            rx.changed().await.expect("session gone before settling");
        }
    }

    async fn yield_briefly() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn blank_input_is_soft_ignored() {
        let service = FakeService::new(Behavior::Respond(real_verdict()));
        let session = session(Arc::clone(&service));
        session.set_title("   ");
        session.set_body("\t\n");
        session.submit();

        assert!(matches!(session.request(), RequestState::Idle));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn successful_submit_normalizes_and_settles() {
        let service = FakeService::new(Behavior::Respond(real_verdict()));
        let session = session(Arc::clone(&service));
        let mut rx = session.subscribe();

        session.set_title("https://example.com/a");
        session.submit();

        match settle(&mut rx).await {
            RequestState::Succeeded { report } => {
                assert_eq!(report.verdict.to_string(), "REAL");
                assert_eq!(report.confidence, 100);
                assert_eq!(report.style.to_string(), "RELIABLE");
                let kept: Vec<&str> = report.sources.iter().map(|u| u.as_str()).collect();
                assert_eq!(kept, vec!["https://x.com/y"]);
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_then_reset_and_retry() {
        let service = FakeService::new(Behavior::FailThenRespond(real_verdict()));
        let session = session(Arc::clone(&service));
        let mut rx = session.subscribe();

        session.set_title("https://example.com/a");
        session.submit();
        match settle(&mut rx).await {
            RequestState::Failed { message } => assert_eq!(message, TRANSPORT_FAILURE_MESSAGE),
            other => panic!("expected failure, got {other:?}"),
        }

        session.reset();
        assert!(matches!(session.request(), RequestState::Idle));
        // Input survives the reset for an unchanged retry.
        assert_eq!(session.input().title, "https://example.com/a");

        session.submit();
        assert!(matches!(
            settle(&mut rx).await,
            RequestState::Succeeded { .. }
        ));
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn service_reported_error_surfaces_verbatim() {
        let raw: RawVerdict = serde_json::from_str(r#"{"error":"Scrape failed"}"#).unwrap();
        let service = FakeService::new(Behavior::Respond(raw));
        let session = session(service);
        let mut rx = session.subscribe();

        session.set_title("https://example.com/a");
        session.submit();
        match settle(&mut rx).await {
            RequestState::Failed { message } => assert_eq!(message, "Scrape failed"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_submit_while_loading_is_rejected() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::new(Behavior::RespondWhenReleased(
            Arc::clone(&gate),
            real_verdict(),
        ));
        let session = session(Arc::clone(&service));
        let mut rx = session.subscribe();

        session.set_title("claim");
        session.submit();
        session.submit();
        session.submit();
        yield_briefly().await;

        assert_eq!(service.calls(), 1, "only one network call may be issued");

        gate.notify_one();
        assert!(matches!(
            settle(&mut rx).await,
            RequestState::Succeeded { .. }
        ));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stage_timer_advances_and_holds_at_the_last_stage() {
        let service = FakeService::new(Behavior::Hang);
        let session = session(service);

        session.set_title("claim");
        session.submit();

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        match session.request() {
            RequestState::Loading { stage, .. } => assert_eq!(stage, 1),
            other => panic!("expected loading, got {other:?}"),
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        match session.request() {
            RequestState::Loading { stage, .. } => assert_eq!(stage, MAX_STAGE),
            other => panic!("expected loading, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn settle_preempts_the_stage_timer() {
        let service = FakeService::new(Behavior::Respond(real_verdict()));
        let session = session(service);
        let mut rx = session.subscribe();

        session.set_title("claim");
        session.submit();
        // The response arrives well before the first tick would.
        assert!(matches!(
            settle(&mut rx).await,
            RequestState::Succeeded { .. }
        ));

        // No tick ever demotes a settled request back to loading.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(matches!(
            session.request(),
            RequestState::Succeeded { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_the_timer_and_suppresses_the_late_response() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::new(Behavior::RespondWhenReleased(
            Arc::clone(&gate),
            real_verdict(),
        ));
        let session = session(Arc::clone(&service));

        session.set_title("claim");
        session.submit();
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        session.shutdown();
        let stage_at_shutdown = match session.request() {
            RequestState::Loading { stage, .. } => stage,
            other => panic!("expected loading, got {other:?}"),
        };

        // Release the pending response after teardown: it must be dropped,
        // and the timer must not tick again.
        gate.notify_one();
        tokio::time::sleep(Duration::from_secs(10)).await;

        match session.request() {
            RequestState::Loading { stage, .. } => assert_eq!(stage, stage_at_shutdown),
            other => panic!("stale response was applied: {other:?}"),
        }
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_while_loading_cancels_the_flight() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::new(Behavior::RespondWhenReleased(
            Arc::clone(&gate),
            real_verdict(),
        ));
        let session = session(Arc::clone(&service));

        session.set_title("claim");
        session.submit();
        tokio::time::sleep(Duration::from_millis(100)).await;

        session.reset();
        assert!(matches!(session.request(), RequestState::Idle));

        gate.notify_one();
        tokio::time::sleep(Duration::from_secs(5)).await;
        // The late result is stale and must not resurrect the request.
        assert!(matches!(session.request(), RequestState::Idle));
    }

    #[tokio::test]
    async fn mode_may_change_mid_flight_without_disturbing_the_request() {
        let service = FakeService::new(Behavior::Hang);
        let session = session(service);

        session.set_title("headline");
        session.set_body("article text");
        session.submit();

        session.set_mode(InputMode::Article);
        assert_eq!(session.mode(), InputMode::Article);
        assert!(session.request().is_loading());
        // Body is retained when switching away again.
        session.set_mode(InputMode::Url);
        assert_eq!(session.input().body, "article text");
    }
}
