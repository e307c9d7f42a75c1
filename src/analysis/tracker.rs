//! Per-file analysis tracker.
//!
//! Owns everything known about one file's analysis run: the latest
//! status, the fetched result, in-flight flags, and the three error
//! channels (trigger, poll, result fetch). A background task polls
//! status every [`POLL_INTERVAL`](crate::config::POLL_INTERVAL) while
//! the run is `pending` or `processing` and parks otherwise; a
//! successful trigger wakes it immediately so the UI leaves
//! "not started" without waiting out the polling clock.
//!
//! Status responses carry a sequence number taken when the request is
//! issued; a response is applied only if no newer response has landed
//! first, so a slow poll can never overwrite the status a trigger
//! just installed.

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::auth::Credential;
use crate::backend::{BackendError, DicomBackend};
use crate::config::POLL_INTERVAL;
use crate::models::{AnalysisResult, AnalysisState, AnalysisStatus};

/// Read-only copy of the tracker's state at one instant.
#[derive(Debug, Clone, Default)]
pub struct TrackerSnapshot {
    pub status: Option<AnalysisStatus>,
    pub result: Option<AnalysisResult>,
    pub trigger_in_flight: bool,
    pub trigger_error: Option<String>,
    pub poll_error: Option<String>,
    pub fetch_error: Option<String>,
}

#[derive(Default)]
struct TrackerState {
    status: Option<AnalysisStatus>,
    result: Option<AnalysisResult>,
    /// Bumped on every successful trigger; identifies the lifecycle run.
    run: u64,
    /// Sequence counter for issued status requests.
    status_seq: u64,
    /// Highest sequence number applied so far.
    status_applied: u64,
    trigger_in_flight: bool,
    trigger_error: Option<String>,
    poll_error: Option<String>,
    fetch_error: Option<String>,
}

impl TrackerState {
    fn next_seq(&mut self) -> u64 {
        self.status_seq += 1;
        self.status_seq
    }

    /// Apply a status response unless a newer one already landed.
    /// Returns whether it was applied.
    fn apply_status(&mut self, seq: u64, status: AnalysisStatus) -> bool {
        if seq <= self.status_applied {
            return false;
        }
        self.status_applied = seq;
        self.status = Some(status);
        self.poll_error = None;
        true
    }

    fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            status: self.status.clone(),
            result: self.result.clone(),
            trigger_in_flight: self.trigger_in_flight,
            trigger_error: self.trigger_error.clone(),
            poll_error: self.poll_error.clone(),
            fetch_error: self.fetch_error.clone(),
        }
    }
}

/// Tracks one file's analysis lifecycle against the backend.
pub struct AnalysisTracker {
    subject_id: String,
    backend: Arc<dyn DicomBackend>,
    cred: Credential,
    state: Mutex<TrackerState>,
    /// Wakes the poll loop out of its park or interval sleep.
    wake: Notify,
    cancel: CancellationToken,
}

impl AnalysisTracker {
    /// Start tracking: spawns the poll loop, which fetches status
    /// immediately on activation.
    pub fn activate(
        backend: Arc<dyn DicomBackend>,
        cred: Credential,
        subject_id: impl Into<String>,
    ) -> Arc<Self> {
        let tracker = Arc::new(Self {
            subject_id: subject_id.into(),
            backend,
            cred,
            state: Mutex::new(TrackerState::default()),
            wake: Notify::new(),
            cancel: CancellationToken::new(),
        });

        let loop_tracker = Arc::clone(&tracker);
        tokio::spawn(async move {
            loop_tracker.poll_loop().await;
        });

        tracker
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Stop tracking. In-flight requests are abandoned; no state
    /// update from them will be observed afterwards.
    pub fn deactivate(&self) {
        self.cancel.cancel();
        tracing::debug!(subject_id = %self.subject_id, "analysis tracker deactivated");
    }

    pub fn is_deactivated(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.state.lock().unwrap().snapshot()
    }

    /// Ask the backend to start (or restart) the analysis.
    ///
    /// A second call while one is in flight is a no-op. On success the
    /// previous run's result and errors are dropped and the poll loop
    /// is woken for an immediate status check; on failure only the
    /// trigger error channel is set and polling is left alone.
    pub async fn trigger(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        {
            let mut state = self.state.lock().unwrap();
            if state.trigger_in_flight {
                tracing::debug!(subject_id = %self.subject_id, "trigger suppressed, already in flight");
                return;
            }
            state.trigger_in_flight = true;
        }

        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => {
                self.state.lock().unwrap().trigger_in_flight = false;
                return;
            }
            r = self.backend.trigger_analysis(&self.cred, &self.subject_id) => r,
        };

        let woken = {
            let mut state = self.state.lock().unwrap();
            state.trigger_in_flight = false;
            match outcome {
                Ok(status) => {
                    tracing::info!(
                        subject_id = %self.subject_id,
                        status = %status.status,
                        "analysis triggered"
                    );
                    state.run += 1;
                    state.result = None;
                    state.fetch_error = None;
                    state.trigger_error = None;
                    let seq = state.next_seq();
                    state.apply_status(seq, status);
                    true
                }
                Err(e) => {
                    tracing::warn!(subject_id = %self.subject_id, error = %e, "trigger failed");
                    state.trigger_error = Some(e.to_string());
                    false
                }
            }
        };

        if woken {
            self.wake.notify_one();
        }
    }

    async fn poll_loop(&self) {
        loop {
            if self.cancel.is_cancelled() {
                return;
            }

            let seq = self.state.lock().unwrap().next_seq();
            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => return,
                r = self.backend.analysis_status(&self.cred, &self.subject_id) => r,
            };

            let (keep_polling, fetch_run) = self.handle_poll_outcome(seq, outcome);

            if let Some(run) = fetch_run {
                self.fetch_result(run).await;
                if self.cancel.is_cancelled() {
                    return;
                }
            }

            if keep_polling {
                tokio::select! {
                    _ = self.cancel.cancelled() => return,
                    _ = tokio::time::sleep(POLL_INTERVAL) => {}
                    _ = self.wake.notified() => {}
                }
            } else {
                // Terminal, not started, or errored: park until a
                // trigger wakes us or the tracker is deactivated.
                tokio::select! {
                    _ = self.cancel.cancelled() => return,
                    _ = self.wake.notified() => {}
                }
            }
        }
    }

    /// Returns (keep polling at interval, run to fetch a result for).
    fn handle_poll_outcome(
        &self,
        seq: u64,
        outcome: Result<AnalysisStatus, BackendError>,
    ) -> (bool, Option<u64>) {
        let mut state = self.state.lock().unwrap();
        match outcome {
            Ok(status) => {
                let lifecycle = status.status;
                if !state.apply_status(seq, status) {
                    // A newer response (trigger or later poll) already
                    // landed; keep following whatever it installed.
                    let current = state.status.as_ref().map(|s| s.status);
                    return (current.is_some_and(|s| s.is_active()), None);
                }
                let fetch = (lifecycle == AnalysisState::Completed
                    && state.result.is_none()
                    && state.fetch_error.is_none())
                .then_some(state.run);
                (lifecycle.is_active(), fetch)
            }
            Err(e) => {
                tracing::warn!(subject_id = %self.subject_id, error = %e, "status poll failed");
                state.poll_error = Some(e.to_string());
                (false, None)
            }
        }
    }

    /// Fetch the completed run's result. `run` is the lifecycle run
    /// the fetch belongs to; if a new trigger lands while the fetch
    /// is in flight the payload is stale and gets discarded.
    async fn fetch_result(&self, run: u64) {
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => return,
            r = self.backend.analysis_result(&self.cred, &self.subject_id) => r,
        };

        let mut state = self.state.lock().unwrap();
        if state.run != run {
            tracing::debug!(subject_id = %self.subject_id, "discarding result from superseded run");
            return;
        }
        match outcome {
            Ok(result) => {
                tracing::info!(subject_id = %self.subject_id, "analysis result fetched");
                state.result = Some(result);
            }
            Err(e) => {
                tracing::warn!(subject_id = %self.subject_id, error = %e, "result fetch failed");
                state.fetch_error = Some(e.to_string());
            }
        }
    }
}

impl Drop for AnalysisTracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
