//! # lf-queue
//!
//! A fixed-capacity, multi-producer/multi-consumer FIFO queue built from atomic
//! cursors and compare-and-swap retry loops instead of operating-system locks.
//!
//! The queue exists to decouple a real-time producer (for example a camera
//! capture loop) from a slower consumer (for example a disk writer): pushing
//! never blocks on the consumer, and memory use is bounded by the capacity
//! chosen at construction.
//!
//! ## Features
//!
//! - **Bounded MPMC queue**: [`BoundedQueue`], `capacity + 1` slots allocated once
//! - **Claim/commit protocol**: four cache-padded atomic cursors, no mutexes
//! - **Fail-fast push**: a full queue rejects the value with [`Error::CapacityExceeded`]
//! - **Polling pop**: an empty queue returns `None` immediately
//!
//! ## Quick Start
//!
//! ```rust
//! use lf_queue::BoundedQueue;
//!
//! let queue = BoundedQueue::new(10);
//! queue.push(42)?;
//! assert_eq!(queue.pop(), Some(42));
//! assert!(queue.is_empty());
//! # Ok::<(), lf_queue::Error>(())
//! ```
//!
//! ## Thread Safety
//!
//! `BoundedQueue<T>` is `Send + Sync` whenever `T: Send`. Share it through an
//! [`Arc`](std::sync::Arc) or a scoped-thread borrow; every operation takes
//! `&self`.
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` for [`Error`], yielding backoff in spin loops
//! - `alloc`: heap slot storage, required by the queue (implied by `std`)
//!
//! Model checking with [loom](https://docs.rs/loom) is enabled by building with
//! `RUSTFLAGS="--cfg loom"`.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod metrics;
#[cfg(feature = "alloc")]
pub mod queue;
pub mod ring;

mod sync;

#[cfg(feature = "alloc")]
pub use crate::queue::{BoundedQueue, Drain};
pub use crate::metrics::QueueMetrics;

/// Common utilities and helper types
pub mod util {
    use core::ops::Deref;

    /// Cache line size for alignment purposes
    pub const CACHE_LINE_SIZE: usize = 64;

    /// Pads and aligns a value to the cache line size.
    ///
    /// The queue keeps each of its four cursors in its own `CachePadded` so that
    /// producers spinning on `push_cursor` do not invalidate the line consumers
    /// are spinning on.
    #[repr(align(64))]
    pub struct CachePadded<T> {
        value: T,
    }

    impl<T> CachePadded<T> {
        /// Create a new cache-padded value
        #[inline]
        pub const fn new(value: T) -> Self {
            Self { value }
        }

        /// Get the inner value
        #[inline]
        pub fn into_inner(self) -> T {
            self.value
        }
    }

    impl<T> Deref for CachePadded<T> {
        type Target = T;

        #[inline]
        fn deref(&self) -> &T {
            &self.value
        }
    }

    impl<T: Default> Default for CachePadded<T> {
        fn default() -> Self {
            Self::new(T::default())
        }
    }

    impl<T: core::fmt::Debug> core::fmt::Debug for CachePadded<T> {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Debug::fmt(&self.value, f)
        }
    }
}

/// Error types for queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The queue was observed full; the pushed value was not stored.
    CapacityExceeded,
    /// A queue was requested with a capacity of zero.
    ZeroCapacity,
    /// The requested capacity leaves no room for the sentinel slot.
    CapacityOverflow,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::CapacityExceeded => write!(f, "Queue capacity reached"),
            Error::ZeroCapacity => write!(f, "Queue capacity must be greater than 0"),
            Error::CapacityOverflow => write!(f, "Queue capacity is too large"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A push rejected because the queue was full, carrying the value back.
///
/// Returned by [`BoundedQueue::try_push`]. Converts into
/// [`Error::CapacityExceeded`] so it can be propagated with `?`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PushError<T>(pub T);

impl<T> PushError<T> {
    /// Recover the value that could not be pushed.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> core::fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("PushError").finish_non_exhaustive()
    }
}

impl<T> core::fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&Error::CapacityExceeded, f)
    }
}

#[cfg(feature = "std")]
impl<T> std::error::Error for PushError<T> {}

impl<T> From<PushError<T>> for Error {
    fn from(_: PushError<T>) -> Self {
        Error::CapacityExceeded
    }
}

/// Result type for queue operations
pub type Result<T> = core::result::Result<T, Error>;
