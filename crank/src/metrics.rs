//! Crank metrics.
//!
//! Atomic counters for monitoring one settlement run. The crank is a
//! scheduled job, so these mostly feed the end-of-run log line and
//! tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the settlement crank.
#[derive(Debug, Default)]
pub struct CrankMetrics {
    /// Settlement submissions attempted.
    settle_attempts: AtomicU64,

    /// Settlement submissions that failed (including retried ones).
    settle_failures: AtomicU64,

    /// Refund batches submitted successfully.
    batches_submitted: AtomicU64,

    /// Refund batches that failed.
    batches_failed: AtomicU64,

    /// Bidders refunded across all batches.
    bidders_refunded: AtomicU64,
}

impl CrankMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a settlement submission attempt.
    pub fn record_settle_attempt(&self) {
        self.settle_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed settlement submission.
    pub fn record_settle_failure(&self) {
        self.settle_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful refund batch of the given size.
    pub fn record_batch(&self, bidders: usize) {
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
        self.bidders_refunded
            .fetch_add(bidders as u64, Ordering::Relaxed);
    }

    /// Records a failed refund batch.
    pub fn record_batch_failure(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns settlement submission attempts.
    #[must_use]
    pub fn settle_attempts(&self) -> u64 {
        self.settle_attempts.load(Ordering::Relaxed)
    }

    /// Returns failed settlement submissions.
    #[must_use]
    pub fn settle_failures(&self) -> u64 {
        self.settle_failures.load(Ordering::Relaxed)
    }

    /// Returns refund batches submitted.
    #[must_use]
    pub fn batches_submitted(&self) -> u64 {
        self.batches_submitted.load(Ordering::Relaxed)
    }

    /// Returns failed refund batches.
    #[must_use]
    pub fn batches_failed(&self) -> u64 {
        self.batches_failed.load(Ordering::Relaxed)
    }

    /// Returns bidders refunded.
    #[must_use]
    pub fn bidders_refunded(&self) -> u64 {
        self.bidders_refunded.load(Ordering::Relaxed)
    }
}
