//! Bounded Multi-Producer, Multi-Consumer Queue
//!
//! [`BoundedQueue<T>`] owns the slot storage and exposes the typed API. All
//! coordination between threads is delegated to the claim/commit protocol in
//! `cursor`; this module only moves values in and out of the
//! slot a successful claim hands it.
//!
//! ## Slot Layout
//!
//! ```text
//! capacity = 4, modulus = 5
//!
//!   slot:      0     1     2     3     4
//!            [ a ] [ b ] [   ] [   ] [   ]
//!                          ^                 ^
//!                     push_cursor       pop_cursor (one behind slot 0)
//! ```
//!
//! One slot is always left unused so that a full ring (`push_cursor ==
//! pop_cursor`) is distinguishable from an empty one (`push_cursor ==
//! pop_cursor + 1`).

use crate::metrics::QueueMetrics;
use crate::queue::cursor::Cursors;
use crate::sync::UnsafeCell;
use crate::{Error, PushError, Result};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::mem::MaybeUninit;

type Slot<T> = UnsafeCell<MaybeUninit<T>>;

/// A bounded, lock-free, multi-producer multi-consumer FIFO queue
///
/// The queue holds at most `capacity` values in `capacity + 1` slots allocated
/// once at construction. No operation takes a lock or parks the thread: waiting
/// for another thread to finish its half of the protocol is a short spin.
///
/// # Behavior
///
/// - **Push**: fails fast with [`Error::CapacityExceeded`] when the queue is
///   observed full. The fullness check is best-effort: a push racing with a pop
///   can be rejected even though a slot is about to be freed. Callers decide
///   whether to retry, drop the value, or propagate the error.
/// - **Pop**: returns `None` immediately when the queue is empty. Popping an
///   empty queue any number of times is harmless.
/// - **Size**: [`len`](Self::len) is advisory and may be stale the moment it
///   returns; [`is_empty`](Self::is_empty) is the cheap check consumers poll.
///
/// # Ordering
///
/// Values are popped in the order their pushes were committed. With a single
/// producer that is call order, so a single-producer/single-consumer pipeline
/// is strictly FIFO. With several producers, relative order between producers
/// is the order in which they won the claim on `push_cursor`, not the order in
/// which they called `push`.
///
/// # Examples
///
/// ```rust
/// use lf_queue::BoundedQueue;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(BoundedQueue::new(10));
///
/// let producer = thread::spawn({
///     let queue = Arc::clone(&queue);
///     move || {
///         for i in 0..100 {
///             while queue.push(i).is_err() {
///                 // Queue full, retry
///                 thread::yield_now();
///             }
///         }
///     }
/// });
///
/// let mut received = Vec::new();
/// while received.len() < 100 {
///     if let Some(value) = queue.pop() {
///         received.push(value);
///     }
/// }
///
/// producer.join().unwrap();
/// assert_eq!(received, (0..100).collect::<Vec<_>>());
/// assert!(queue.is_empty());
/// ```
pub struct BoundedQueue<T> {
    cursors: Cursors,
    slots: Box<[Slot<T>]>,
}

// SAFETY: values are moved between threads through the slots, which needs
// `T: Send`. Concurrent access to a slot is excluded by the claim protocol:
// only the thread whose CAS claimed a position touches that slot until it
// commits.
unsafe impl<T: Send> Send for BoundedQueue<T> {}
unsafe impl<T: Send> Sync for BoundedQueue<T> {}

impl<T> BoundedQueue<T> {
    /// Create a new queue holding at most `capacity` values
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or `usize::MAX`. Use [`try_new`](Self::try_new)
    /// to get an error instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue: BoundedQueue<i32> = BoundedQueue::new(10);
    /// assert_eq!(queue.capacity(), 10);
    /// ```
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Queue capacity must be greater than 0");
        assert!(capacity < usize::MAX, "Queue capacity is too large");
        Self::with_capacity(capacity)
    }

    /// Create a new queue, returning an error for an unusable capacity
    ///
    /// A zero capacity yields [`Error::ZeroCapacity`]. A capacity with no room
    /// left for the sentinel slot (`capacity + 1` overflows) yields
    /// [`Error::CapacityOverflow`].
    ///
    /// ```rust
    /// use lf_queue::{BoundedQueue, Error};
    ///
    /// assert!(BoundedQueue::<u8>::try_new(4).is_ok());
    /// assert_eq!(BoundedQueue::<u8>::try_new(0).unwrap_err(), Error::ZeroCapacity);
    /// assert_eq!(
    ///     BoundedQueue::<u8>::try_new(usize::MAX).unwrap_err(),
    ///     Error::CapacityOverflow
    /// );
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if capacity.checked_add(1).is_none() {
            return Err(Error::CapacityOverflow);
        }
        Ok(Self::with_capacity(capacity))
    }

    fn with_capacity(capacity: usize) -> Self {
        let cursors = Cursors::new(capacity);
        let slots: Vec<Slot<T>> = (0..cursors.slot_count())
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();

        tracing::trace!(capacity, slots = slots.len(), "created bounded queue");

        Self {
            cursors,
            slots: slots.into_boxed_slice(),
        }
    }

    /// Push a value onto the back of the queue
    ///
    /// Returns `Err(Error::CapacityExceeded)` without retrying when the queue
    /// is observed full; the value is dropped. Use
    /// [`try_push`](Self::try_push) to get the value back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lf_queue::{BoundedQueue, Error};
    ///
    /// let queue = BoundedQueue::new(1);
    /// assert!(queue.push(42).is_ok());
    /// assert_eq!(queue.push(43), Err(Error::CapacityExceeded));
    /// ```
    #[inline]
    pub fn push(&self, value: T) -> Result<()> {
        self.try_push(value).map_err(Error::from)
    }

    /// Push a value, handing it back inside [`PushError`] if the queue is full
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(1);
    /// queue.try_push("first").unwrap();
    /// let rejected = queue.try_push("second").unwrap_err();
    /// assert_eq!(rejected.into_inner(), "second");
    /// ```
    pub fn try_push(&self, value: T) -> core::result::Result<(), PushError<T>> {
        let pos = match self.cursors.claim_push() {
            Ok(pos) => pos,
            Err(_) => {
                tracing::trace!(capacity = self.capacity(), "push rejected, queue full");
                return Err(PushError(value));
            }
        };

        // SAFETY: the claim on `pos` is exclusive until `commit_push`, and the
        // slot was vacated (or never written) before `push_limit` let us claim it.
        self.slots[pos].with_mut(|ptr| unsafe { ptr.write(MaybeUninit::new(value)) });
        self.cursors.commit_push(pos);
        Ok(())
    }

    /// Pop the value at the front of the queue
    ///
    /// Returns `None` immediately if the queue is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(10);
    /// queue.push(42).unwrap();
    /// assert_eq!(queue.pop(), Some(42));
    /// assert_eq!(queue.pop(), None);
    /// ```
    pub fn pop(&self) -> Option<T> {
        let slot = self.cursors.claim_pop()?;

        // SAFETY: the slot was written and committed by a producer (we observed
        // `pop_limit` past it), and our claim is exclusive until `commit_pop`.
        // Reading moves the value out; the slot is vacant from here on.
        let value = self.slots[slot].with_mut(|ptr| unsafe { ptr.read().assume_init() });
        self.cursors.commit_pop(slot);
        Some(value)
    }

    /// Advisory number of values in the queue
    ///
    /// Computed from two independent atomic reads. Under concurrent use the
    /// count may be stale by the time it is returned; never rely on it for
    /// correctness. It never exceeds [`capacity`](Self::capacity).
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(10);
    /// assert_eq!(queue.len(), 0);
    /// queue.push(42).unwrap();
    /// assert_eq!(queue.len(), 1);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// Alias for [`len`](Self::len)
    #[inline]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Whether the queue is empty
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(10);
    /// assert!(queue.is_empty());
    /// queue.push(42).unwrap();
    /// assert!(!queue.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Alias for [`is_empty`](Self::is_empty)
    #[inline]
    pub fn empty(&self) -> bool {
        self.is_empty()
    }

    /// Maximum number of values the queue can hold
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cursors.capacity()
    }

    /// Alias for [`capacity`](Self::capacity)
    #[inline]
    pub fn max_size(&self) -> usize {
        self.capacity()
    }

    /// Push values until the first rejected push
    ///
    /// Returns how many values were pushed. The value that hit the full queue
    /// and everything after it are dropped.
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(3);
    /// assert_eq!(queue.push_batch(0..5), 3);
    /// ```
    pub fn push_batch<I>(&self, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut pushed = 0;
        for value in values {
            if self.try_push(value).is_err() {
                break;
            }
            pushed += 1;
        }
        pushed
    }

    /// Pop up to `max_values` values, stopping early if the queue runs empty
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(10);
    /// queue.push_batch([1, 2, 3]);
    /// assert_eq!(queue.pop_batch(2), vec![1, 2]);
    /// assert_eq!(queue.pop_batch(5), vec![3]);
    /// ```
    pub fn pop_batch(&self, max_values: usize) -> Vec<T> {
        let mut values = Vec::with_capacity(max_values.min(self.capacity()));
        for _ in 0..max_values {
            match self.pop() {
                Some(value) => values.push(value),
                None => break,
            }
        }
        values
    }

    /// Iterator that pops until the queue is observed empty
    ///
    /// Values pushed concurrently while draining may or may not be yielded.
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(4);
    /// queue.push_batch(['a', 'b']);
    /// assert_eq!(queue.drain().collect::<String>(), "ab");
    /// assert!(queue.is_empty());
    /// ```
    pub fn drain(&self) -> Drain<'_, T> {
        Drain { queue: self }
    }

    /// Snapshot of the queue's size and contention counters
    ///
    /// ```rust
    /// use lf_queue::BoundedQueue;
    ///
    /// let queue = BoundedQueue::new(1);
    /// queue.push(1).unwrap();
    /// let _ = queue.push(2);
    ///
    /// let metrics = queue.metrics();
    /// assert_eq!(metrics.capacity, 1);
    /// assert_eq!(metrics.rejected_pushes, 1);
    /// ```
    pub fn metrics(&self) -> QueueMetrics {
        let capacity = self.capacity();
        let current_len = self.len();
        let counters = self.cursors.counters();
        QueueMetrics {
            capacity,
            current_len,
            is_empty: current_len == 0,
            utilization_ratio: current_len as f64 / capacity as f64,
            rejected_pushes: counters.rejected_pushes(),
            push_retries: counters.push_retries(),
            pop_retries: counters.pop_retries(),
        }
    }

    /// Zero the contention counters reported by [`metrics`](Self::metrics)
    pub fn reset_metrics(&self) {
        self.cursors.counters().reset();
    }
}

impl<T> Drop for BoundedQueue<T> {
    fn drop(&mut self) {
        let mut remaining = 0usize;
        for slot in self.cursors.committed_slots() {
            // SAFETY: `&mut self` means no claim is in flight, so every slot
            // between the read and write heads holds a committed value.
            self.slots[slot].with_mut(|ptr| unsafe { (*ptr).assume_init_drop() });
            remaining += 1;
        }
        if remaining > 0 {
            tracing::debug!(remaining, "dropped bounded queue with values still queued");
        }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positions = self.cursors.positions();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("push_cursor", &positions.push_cursor)
            .field("pop_cursor", &positions.pop_cursor)
            .field("push_limit", &positions.push_limit)
            .field("pop_limit", &positions.pop_limit)
            .finish()
    }
}

/// Draining iterator returned by [`BoundedQueue::drain`]
#[derive(Debug)]
pub struct Drain<'a, T> {
    queue: &'a BoundedQueue<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.queue.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.queue.capacity()))
    }
}
