//! Reconcile cycle counters and their Prometheus text exposition.
//!
//! The counters are the only state shared between the reconcile loop and the
//! metrics endpoint. They only ever go up, so relaxed atomics are enough.

use crate::reconciler::{CycleOutcome, Outcome};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for reconcile cycles
///
/// A cycle cancelled by shutdown counts as attempted but neither succeeded
/// nor failed, so after shutdown `attempted` can exceed `succeeded + failed`
/// by one.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    no_change: AtomicU64,
    updated: AtomicU64,
}

/// Point-in-time copy of [`SyncMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub no_change: u64,
    pub updated: u64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a cycle that is about to start
    pub fn cycle_started(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count the result of a finished cycle
    pub fn cycle_finished(&self, result: &crate::Result<CycleOutcome>) {
        match Outcome::of(result) {
            Outcome::NoChange => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                self.no_change.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Updated => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                self.updated.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            no_change: self.no_change.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
        }
    }

    /// Render the counters in Prometheus text format.
    pub fn render_prometheus(&self) -> String {
        let s = self.snapshot();
        let mut out = String::new();

        let counters = [
            ("syncip_ip_sync_count", "Number of IP checks performed", s.attempted),
            ("syncip_ip_sync_succeeded", "Number of IP checks that succeeded", s.succeeded),
            ("syncip_ip_sync_failed", "Number of IP checks that failed", s.failed),
            (
                "syncip_ip_sync_no_change",
                "Number of IP checks that resulted in no change",
                s.no_change,
            ),
            (
                "syncip_ip_sync_updated",
                "Number of IP checks that resulted in an update",
                s.updated,
            ),
        ];

        for (name, help, value) in counters {
            out.push_str(&format!("# HELP {name} {help}\n"));
            out.push_str(&format!("# TYPE {name} counter\n"));
            out.push_str(&format!("{name} {value}\n"));
        }

        out
    }
}
