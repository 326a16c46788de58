use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters for the stock service.
///
/// Owned by whoever runs the service and shared by reference; there is no
/// process-global registry.
#[derive(Debug, Default)]
pub struct StockMetrics {
    withdrawals: AtomicU64,
    rejected_withdrawals: AtomicU64,
    concurrency_conflicts: AtomicU64,
    invariant_violations: AtomicU64,
}

/// Point-in-time copy of [`StockMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub withdrawals: u64,
    pub rejected_withdrawals: u64,
    pub concurrency_conflicts: u64,
    pub invariant_violations: u64,
}

impl StockMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_withdrawal(&self) {
        self.withdrawals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_withdrawal(&self) {
        self.rejected_withdrawals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conflict(&self) {
        self.concurrency_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// A stock record with `emergency > minimum` was seen.
    pub fn record_invariant_violation(&self) {
        self.invariant_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            withdrawals: self.withdrawals.load(Ordering::Relaxed),
            rejected_withdrawals: self.rejected_withdrawals.load(Ordering::Relaxed),
            concurrency_conflicts: self.concurrency_conflicts.load(Ordering::Relaxed),
            invariant_violations: self.invariant_violations.load(Ordering::Relaxed),
        }
    }
}
