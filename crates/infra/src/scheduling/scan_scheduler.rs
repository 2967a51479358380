//! Debounced scan scheduler.
//!
//! Owns the only mutable shared resources in the system: one pending timer
//! and one scan lock per subject. Timer handles are tracked, cancellation is
//! explicit, and shutdown joins every outstanding timer within a timeout.
//!
//! Guarantees, per subject:
//! - bursts of triggers collapse into a single eventual scan on the content
//!   current at fire time
//! - at most one scan is in flight; later triggers queue on the subject's
//!   scan lock instead of running concurrently
//! - a forced scan is serialized against any in-flight debounced scan and
//!   reflects the supplied content, never a stale interleaving

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use phigate_core::detection::PhiDetector;
use phigate_core::ports::{AuditEventSink, ContentProvider};
use phigate_domain::constants::DEFAULT_DEBOUNCE_SECS;
use phigate_domain::{GovernanceEvent, Result, ScanResult};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};

/// Configuration for the scan scheduler.
#[derive(Debug, Clone)]
pub struct ScanSchedulerConfig {
    /// Trailing debounce window for scheduled scans.
    pub debounce: Duration,
    /// Timeout for joining timer tasks during shutdown.
    pub join_timeout: Duration,
}

impl Default for ScanSchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(DEFAULT_DEBOUNCE_SECS),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// An armed debounce timer for one subject.
struct PendingScan {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Per-subject scheduler state.
#[derive(Default)]
struct SubjectState {
    pending: Option<PendingScan>,
    /// Serializes scans for this subject; guarantees at most one in flight.
    scan_lock: Arc<AsyncMutex<()>>,
    latest: Option<ScanResult>,
}

struct SchedulerInner {
    detector: Arc<PhiDetector>,
    provider: Arc<dyn ContentProvider>,
    events: Arc<dyn AuditEventSink>,
    config: ScanSchedulerConfig,
    subjects: Mutex<HashMap<String, SubjectState>>,
}

/// Per-subject debounced scan scheduler.
pub struct ScanScheduler {
    inner: Arc<SchedulerInner>,
}

impl ScanScheduler {
    pub fn new(
        detector: Arc<PhiDetector>,
        provider: Arc<dyn ContentProvider>,
        events: Arc<dyn AuditEventSink>,
        config: ScanSchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                detector,
                provider,
                events,
                config,
                subjects: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Arm or reset the trailing debounce timer for a subject.
    ///
    /// Repeated calls within the window collapse into a single eventual
    /// scan; the content provider is consulted only when the scan actually
    /// fires, so the scan sees the content current at fire time.
    #[instrument(skip(self))]
    pub fn schedule_scan(&self, subject_id: &str) {
        let cancel = CancellationToken::new();
        let fired = cancel.clone();
        let inner = Arc::clone(&self.inner);
        let subject = subject_id.to_string();
        let debounce = self.inner.config.debounce;

        let mut map = self.inner.subjects.lock();
        let state = map.entry(subject_id.to_string()).or_default();

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = fired.cancelled() => {}
                () = tokio::time::sleep(debounce) => {
                    inner.execute_scan(&subject).await;
                }
            }
        });

        if let Some(previous) = state.pending.replace(PendingScan { cancel, handle }) {
            debug!(subject_id, "debounce timer reset");
            previous.cancel.cancel();
        }
    }

    /// Bypass the debounce timer and scan `content` now.
    ///
    /// Cancels any pending timer for the subject, serializes against an
    /// in-flight scan, and returns the resulting scan result. Used at
    /// required gating points (commit, export) where a stale result is
    /// unacceptable. Detector errors propagate to the caller.
    #[instrument(skip(self, content))]
    pub async fn force_scan(&self, subject_id: &str, content: &str) -> Result<ScanResult> {
        self.cancel_pending(subject_id);

        let lock = self.inner.subject_lock(subject_id);
        let _guard = lock.lock().await;

        let result = self.inner.detector.scan(content)?;
        self.inner.emit_completed(subject_id, &result);
        self.inner.store_latest(subject_id, result.clone());
        Ok(result)
    }

    /// Most recent scan result for a subject, if any.
    pub fn latest_result(&self, subject_id: &str) -> Option<ScanResult> {
        self.inner.subjects.lock().get(subject_id).and_then(|s| s.latest.clone())
    }

    /// Cancel pending timers and discard cached results for a subject.
    /// Called when no collaborators remain; idempotent.
    #[instrument(skip(self))]
    pub fn clear_document_state(&self, subject_id: &str) {
        if let Some(state) = self.inner.subjects.lock().remove(subject_id) {
            if let Some(pending) = state.pending {
                pending.cancel.cancel();
            }
            debug!(subject_id, "document state cleared");
        }
    }

    /// Cancel every timer across all subjects and join the timer tasks.
    ///
    /// Idempotent: cancelling an already-fired or already-cancelled timer is
    /// a no-op. After this returns no timer handle outlives the scheduler.
    pub async fn clear_all(&self) -> SchedulerResult<()> {
        let pending: Vec<PendingScan> = {
            let mut map = self.inner.subjects.lock();
            map.values_mut().filter_map(|state| state.pending.take()).collect()
        };

        for timer in &pending {
            timer.cancel.cancel();
        }

        let join_timeout = self.inner.config.join_timeout;
        for timer in pending {
            match tokio::time::timeout(join_timeout, timer.handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) if join_err.is_cancelled() => {}
                Ok(Err(join_err)) => {
                    return Err(SchedulerError::TaskJoinFailed(join_err.to_string()));
                }
                Err(_) => {
                    warn!("timer task did not stop within join timeout");
                    return Err(SchedulerError::JoinTimeout {
                        seconds: join_timeout.as_secs(),
                    });
                }
            }
        }
        Ok(())
    }

    fn cancel_pending(&self, subject_id: &str) {
        if let Some(state) = self.inner.subjects.lock().get_mut(subject_id) {
            if let Some(pending) = state.pending.take() {
                pending.cancel.cancel();
            }
        }
    }
}

impl SchedulerInner {
    fn subject_lock(&self, subject_id: &str) -> Arc<AsyncMutex<()>> {
        self.subjects.lock().entry(subject_id.to_string()).or_default().scan_lock.clone()
    }

    fn store_latest(&self, subject_id: &str, result: ScanResult) {
        // The entry may have been cleared while the scan ran; a cleared
        // subject keeps no cached result.
        if let Some(state) = self.subjects.lock().get_mut(subject_id) {
            state.latest = Some(result);
        }
    }

    fn emit_completed(&self, subject_id: &str, result: &ScanResult) {
        self.events.emit(GovernanceEvent::ScanCompleted {
            subject_id: subject_id.to_string(),
            risk_level: result.risk_level,
            total_findings: result.findings.len(),
            degraded: result.is_unavailable(),
        });
    }

    /// Run one debounced scan under the subject's scan lock, fetching content
    /// from the provider at fire time. Failures degrade to an explicitly
    /// unavailable result; the fail-closed contract is preserved downstream.
    async fn execute_scan(&self, subject_id: &str) {
        let lock = self.subject_lock(subject_id);
        let _guard = lock.lock().await;

        let result = match self.provider.content_for(subject_id).await {
            Ok(text) => self
                .detector
                .scan(&text)
                .unwrap_or_else(|err| ScanResult::unavailable(err.to_string())),
            Err(err) => {
                warn!(subject_id, %err, "content provider failed, scan degraded");
                ScanResult::unavailable(err.to_string())
            }
        };

        self.emit_completed(subject_id, &result);
        self.store_latest(subject_id, result);
    }
}

impl std::fmt::Debug for ScanScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanScheduler")
            .field("subjects", &self.inner.subjects.lock().len())
            .field("debounce", &self.inner.config.debounce)
            .finish()
    }
}
