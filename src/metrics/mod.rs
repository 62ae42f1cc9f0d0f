//! Queue metrics
//!
//! Lightweight counters for the cold paths of the claim/commit protocol and a
//! point-in-time snapshot type. Counters use `Relaxed` ordering: they are
//! diagnostics, never part of the protocol's synchronization.

use core::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a queue's state and contention history
///
/// Every field is read racily; under concurrent modification the values may be
/// mutually inconsistent by the time they are inspected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueMetrics {
    /// Maximum number of elements the queue can hold
    pub capacity: usize,
    /// Advisory number of elements currently queued
    pub current_len: usize,
    /// Whether the queue was empty when observed
    pub is_empty: bool,
    /// `current_len / capacity`, between 0.0 and 1.0
    pub utilization_ratio: f64,
    /// Pushes rejected with `CapacityExceeded`
    pub rejected_pushes: u64,
    /// Claim CAS attempts on `push_cursor` that failed because another
    /// producer moved the cursor first
    pub push_retries: u64,
    /// Claim CAS attempts on `pop_cursor` that failed because another
    /// consumer moved the cursor first
    pub pop_retries: u64,
}

impl QueueMetrics {
    /// Fraction of observed push attempts that were rejected, as a percentage of
    /// `accepted + rejected`.
    pub fn rejection_rate(&self, accepted: u64) -> f64 {
        let total = accepted + self.rejected_pushes;
        if total == 0 {
            0.0
        } else {
            (self.rejected_pushes as f64 / total as f64) * 100.0
        }
    }
}

/// Contention counters kept by each queue
///
/// Only the queue records into these; callers see them through
/// [`QueueMetrics`].
#[derive(Debug, Default)]
#[cfg_attr(not(feature = "alloc"), allow(dead_code))]
pub(crate) struct ContentionCounters {
    rejected_pushes: AtomicU64,
    push_retries: AtomicU64,
    pop_retries: AtomicU64,
}

impl ContentionCounters {
    /// Create zeroed counters
    pub(crate) const fn new() -> Self {
        Self {
            rejected_pushes: AtomicU64::new(0),
            push_retries: AtomicU64::new(0),
            pop_retries: AtomicU64::new(0),
        }
    }

    /// Record a push rejected because the queue was full
    #[inline]
    pub(crate) fn record_rejected_push(&self) {
        self.rejected_pushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lost claim CAS on the push cursor
    #[inline]
    pub(crate) fn record_push_retry(&self) {
        self.push_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lost claim CAS on the pop cursor
    #[inline]
    pub(crate) fn record_pop_retry(&self) {
        self.pop_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Rejected pushes so far
    pub(crate) fn rejected_pushes(&self) -> u64 {
        self.rejected_pushes.load(Ordering::Relaxed)
    }

    /// Lost push claims so far
    pub(crate) fn push_retries(&self) -> u64 {
        self.push_retries.load(Ordering::Relaxed)
    }

    /// Lost pop claims so far
    pub(crate) fn pop_retries(&self) -> u64 {
        self.pop_retries.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero
    pub(crate) fn reset(&self) {
        self.rejected_pushes.store(0, Ordering::Relaxed);
        self.push_retries.store(0, Ordering::Relaxed);
        self.pop_retries.store(0, Ordering::Relaxed);
    }
}
