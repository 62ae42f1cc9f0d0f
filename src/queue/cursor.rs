//! Claim/commit cursor protocol
//!
//! [`Cursors`] coordinates any number of producers and consumers over a ring of
//! `capacity + 1` positions without ever looking at the values stored there.
//! Every operation is two-phase:
//!
//! ```text
//!            claim (CAS on own cursor)        commit (CAS on opposite limit)
//! push:  push_cursor: P -> P+1     write slot P     pop_limit:  P-1 -> P
//! pop:   pop_cursor:  Q -> Q+1     read slot Q+1    push_limit: Q   -> Q+1
//! ```
//!
//! A successful claim gives the calling thread exclusive ownership of one slot.
//! The commit publishes the slot to the other role. Because each commit CAS
//! expects the limit to sit exactly one position behind, commits land in the
//! order claims were won, never out of order.
//!
//! `pop_cursor` is "one behind": it holds the last position claimed by a
//! consumer, and the slot read next is `increment(pop_cursor)`. Combined with
//! the sentinel slot this distinguishes full (`push_cursor == pop_cursor`) from
//! empty (`push_cursor == increment(pop_cursor)`) without a separate counter.
//!
//! # Memory Ordering
//!
//! Cursor loads are `Acquire`, claim and commit CASes are `AcqRel`. A producer's
//! slot write happens-before its `pop_limit` commit, which a consumer observes
//! with an `Acquire` load before claiming and reading that slot. The
//! `push_limit` commit gives the same edge from a consumer's read to the next
//! producer's write of the slot.
//!
//! # Wraparound
//!
//! Positions wrap modulo `capacity + 1`. A thread stalled between loading a
//! cursor and its CAS while other threads complete exactly `capacity + 1` claims
//! on the same cursor would see its stale CAS succeed. The window is a few
//! instructions wide.

use crate::metrics::ContentionCounters;
use crate::ring::{decrement, distance, increment};
use crate::sync::{AtomicUsize, Ordering, Spin};
use crate::util::CachePadded;
use crate::{Error, Result};

/// The four atomic cursors of a bounded queue.
#[derive(Debug)]
pub(crate) struct Cursors {
    // capacity + 1
    modulus: usize,
    push_cursor: CachePadded<AtomicUsize>,
    pop_cursor: CachePadded<AtomicUsize>,
    push_limit: CachePadded<AtomicUsize>,
    pop_limit: CachePadded<AtomicUsize>,
    counters: ContentionCounters,
}

/// Raw cursor values, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Positions {
    pub(crate) push_cursor: usize,
    pub(crate) pop_cursor: usize,
    pub(crate) push_limit: usize,
    pub(crate) pop_limit: usize,
}

impl Cursors {
    /// Cursors for an empty queue of `capacity` elements.
    ///
    /// `pop_cursor` and both limits start one position behind `push_cursor`,
    /// which leaves the first `capacity` positions claimable by producers.
    ///
    /// Callers validate `capacity` first: it must be non-zero and leave room
    /// for the sentinel slot.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0 && capacity < usize::MAX);
        let modulus = capacity + 1;
        let behind = modulus - 1;

        Self {
            modulus,
            push_cursor: CachePadded::new(AtomicUsize::new(0)),
            pop_cursor: CachePadded::new(AtomicUsize::new(behind)),
            push_limit: CachePadded::new(AtomicUsize::new(behind)),
            pop_limit: CachePadded::new(AtomicUsize::new(behind)),
            counters: ContentionCounters::new(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.modulus - 1
    }

    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.modulus
    }

    #[inline]
    pub(crate) fn counters(&self) -> &ContentionCounters {
        &self.counters
    }

    /// Claim the next writable slot.
    ///
    /// Fails with [`Error::CapacityExceeded`] as soon as the queue is observed
    /// full. The check is a racy read of `pop_cursor`, so a push can be rejected
    /// while a concurrent pop is freeing a slot. While waiting for a consumer to
    /// commit the slot ahead, fullness is re-checked on every turn.
    pub(crate) fn claim_push(&self) -> Result<usize> {
        let spin = Spin::new();
        loop {
            let pos = self.push_cursor.load(Ordering::Acquire);
            let next = increment(pos, self.modulus);

            if pos == self.pop_cursor.load(Ordering::Acquire) {
                self.counters.record_rejected_push();
                return Err(Error::CapacityExceeded);
            }

            // A consumer has claimed the slot behind us but not vacated it yet.
            if pos == self.push_limit.load(Ordering::Acquire) {
                spin.wait();
                continue;
            }

            match self.push_cursor.compare_exchange(
                pos,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(pos),
                Err(_) => self.counters.record_push_retry(),
            }
        }
    }

    /// Publish a slot claimed by [`claim_push`](Self::claim_push) as readable.
    ///
    /// Spins until every earlier claimed push has committed.
    pub(crate) fn commit_push(&self, pos: usize) {
        let prev = decrement(pos, self.modulus);
        let spin = Spin::new();
        while self
            .pop_limit
            .compare_exchange_weak(prev, pos, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            spin.wait();
        }
    }

    /// Claim the next readable slot, or `None` if the queue is empty.
    ///
    /// The same snapshot of `pop_cursor` is used for the empty check, the wait
    /// on `pop_limit`, and the CAS, so a consumer never claims a slot whose
    /// commit it has not observed.
    pub(crate) fn claim_pop(&self) -> Option<usize> {
        let spin = Spin::new();
        loop {
            let pos = self.pop_cursor.load(Ordering::Acquire);
            let next = increment(pos, self.modulus);

            if self.push_cursor.load(Ordering::Acquire) == next {
                return None;
            }

            // A producer has claimed the slot but not written it yet.
            if pos == self.pop_limit.load(Ordering::Acquire) {
                spin.wait();
                continue;
            }

            match self.pop_cursor.compare_exchange(
                pos,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(next),
                Err(_) => self.counters.record_pop_retry(),
            }
        }
    }

    /// Publish a slot claimed by [`claim_pop`](Self::claim_pop) as writable.
    pub(crate) fn commit_pop(&self, slot: usize) {
        let prev = decrement(slot, self.modulus);
        let spin = Spin::new();
        while self
            .push_limit
            .compare_exchange_weak(prev, slot, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            spin.wait();
        }
    }

    /// Advisory number of occupied slots.
    ///
    /// Reads `pop_cursor` and `push_cursor` separately; the result is always in
    /// `0..=capacity` but may be stale under concurrent modification.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        let read_from = increment(self.pop_cursor.load(Ordering::Acquire), self.modulus);
        let write_at = self.push_cursor.load(Ordering::Acquire);
        distance(read_from, write_at, self.modulus)
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        let read_from = increment(self.pop_cursor.load(Ordering::Acquire), self.modulus);
        self.push_cursor.load(Ordering::Acquire) == read_from
    }

    pub(crate) fn positions(&self) -> Positions {
        Positions {
            push_cursor: self.push_cursor.load(Ordering::Acquire),
            pop_cursor: self.pop_cursor.load(Ordering::Acquire),
            push_limit: self.push_limit.load(Ordering::Acquire),
            pop_limit: self.pop_limit.load(Ordering::Acquire),
        }
    }

    /// Slots holding committed values, oldest first.
    ///
    /// Only meaningful while no claim is in flight, i.e. when the caller has
    /// exclusive access to the queue.
    pub(crate) fn committed_slots(&mut self) -> CommittedSlots {
        let Positions {
            push_cursor,
            pop_cursor,
            ..
        } = self.positions();
        CommittedSlots {
            next: increment(pop_cursor, self.modulus),
            end: push_cursor,
            modulus: self.modulus,
        }
    }
}

/// Iterator over the slot indices between the read and write heads.
#[derive(Debug)]
pub(crate) struct CommittedSlots {
    next: usize,
    end: usize,
    modulus: usize,
}

impl Iterator for CommittedSlots {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next == self.end {
            return None;
        }
        let slot = self.next;
        self.next = increment(slot, self.modulus);
        Some(slot)
    }
}
