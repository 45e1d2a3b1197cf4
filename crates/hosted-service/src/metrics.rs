//! Counters for cycles started, succeeded and failed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub started: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl MetricsSnapshot {
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }

    pub fn in_flight(&self) -> u64 {
        self.started.saturating_sub(self.completed())
    }
}

struct Inner {
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    completed: watch::Sender<u64>,
}

/// Shared, cheap to clone cycle counters.
#[derive(Clone)]
pub struct CycleMetrics {
    inner: Arc<Inner>,
}

impl Default for CycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleMetrics {
    pub fn new() -> Self {
        let (completed, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                started: AtomicU64::new(0),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                completed,
            }),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started: self.inner.started.load(Ordering::SeqCst),
            succeeded: self.inner.succeeded.load(Ordering::SeqCst),
            failed: self.inner.failed.load(Ordering::SeqCst),
        }
    }

    /// Resolves once at least `count` cycles have finished, successfully or not.
    pub async fn wait_for_completed(&self, count: u64) {
        let mut completed = self.inner.completed.subscribe();
        // Err only if the sender is gone, and `self` holds it.
        let _ = completed.wait_for(|done| *done >= count).await;
    }

    pub(crate) fn record_started(&self) {
        self.inner.started.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_succeeded(&self) {
        self.inner.succeeded.fetch_add(1, Ordering::SeqCst);
        self.bump_completed();
    }

    pub(crate) fn record_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::SeqCst);
        self.bump_completed();
    }

    fn bump_completed(&self) {
        self.inner.completed.send_modify(|done| *done += 1);
    }
}
