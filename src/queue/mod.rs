//! Queue implementation
//!
//! ## Layout
//!
//! - `cursor`: the claim/commit protocol over four atomic cursors. It decides
//!   which thread owns which ring position and when a slot becomes visible to
//!   the other side, without ever touching a value.
//! - [`bounded`]: [`BoundedQueue<T>`], the typed facade owning the slot storage.
//!
//! ## Guarantees
//!
//! - **Lock-free**: no mutex, condition variable, or parking; waiting is spinning
//! - **Bounded**: `capacity + 1` slots allocated once, never resized
//! - **Fail-fast**: a full push and an empty pop both return immediately
//! - **FIFO per producer**: commit order is claim order
//!
//! ## Typical Use
//!
//! A real-time producer pushes and counts rejections as drops; a consumer polls
//! until the producer has stopped and the queue is empty:
//!
//! ```rust
//! use lf_queue::BoundedQueue;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::thread;
//!
//! let frames = BoundedQueue::new(8);
//! let running = AtomicBool::new(true);
//!
//! let written = thread::scope(|s| {
//!     let writer = s.spawn(|| {
//!         let mut written = 0;
//!         while running.load(Ordering::Acquire) || !frames.is_empty() {
//!             if frames.pop().is_some() {
//!                 written += 1;
//!             }
//!         }
//!         written
//!     });
//!
//!     let mut dropped = 0;
//!     for frame in 0..100u32 {
//!         if frames.push(frame).is_err() {
//!             dropped += 1;
//!         }
//!     }
//!     running.store(false, Ordering::Release);
//!     writer.join().unwrap() + dropped
//! });
//!
//! assert_eq!(written, 100);
//! ```

pub mod bounded;
pub(crate) mod cursor;

pub use bounded::{BoundedQueue, Drain};


#[cfg(all(test, not(loom)))]
mod proptests;

#[cfg(all(test, loom))]
mod loom_tests;
