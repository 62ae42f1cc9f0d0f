//! Synchronization primitives used by the queue.
//!
//! Under `--cfg loom` the atomics, the slot cell, and the spin wait come from
//! loom so the model checker can explore every interleaving of the cursor
//! protocol. Otherwise they are the `core` types plus a cell wrapper exposing the
//! same closure-based API as `loom::cell::UnsafeCell`.

#[cfg(loom)]
pub(crate) use loom::cell::UnsafeCell;
#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicUsize, Ordering};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(not(loom))]
use crossbeam_utils::Backoff;

#[cfg(not(loom))]
#[derive(Debug)]
#[repr(transparent)]
pub(crate) struct UnsafeCell<T>(core::cell::UnsafeCell<T>);

#[cfg(not(loom))]
impl<T> UnsafeCell<T> {
    #[inline]
    pub(crate) const fn new(value: T) -> Self {
        Self(core::cell::UnsafeCell::new(value))
    }

    #[inline]
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
        f(self.0.get())
    }
}

/// Busy-wait helper for the claim and commit loops.
///
/// Spins with exponential backoff, then starts yielding the thread once the
/// backoff is exhausted (yielding needs the `std` feature of `crossbeam-utils`).
#[derive(Debug)]
pub(crate) struct Spin {
    #[cfg(not(loom))]
    backoff: Backoff,
}

impl Spin {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            #[cfg(not(loom))]
            backoff: Backoff::new(),
        }
    }

    #[inline]
    pub(crate) fn wait(&self) {
        #[cfg(loom)]
        loom::thread::yield_now();

        #[cfg(not(loom))]
        self.backoff.snooze();
    }
}
