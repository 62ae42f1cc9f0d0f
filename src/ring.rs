//! Ring index arithmetic
//!
//! Every cursor in the queue is a position on a ring of `capacity + 1` slots.
//! These helpers advance and rewind positions with wraparound and are the only
//! place modular arithmetic on positions happens.

/// Advance `n` by one position on a ring of size `modulus`.
///
/// ```rust
/// use lf_queue::ring::increment;
///
/// assert_eq!(increment(3, 11), 4);
/// assert_eq!(increment(10, 11), 0);
/// ```
#[inline]
pub const fn increment(n: usize, modulus: usize) -> usize {
    (n + 1) % modulus
}

/// Rewind `n` by one position on a ring of size `modulus`.
///
/// ```rust
/// use lf_queue::ring::decrement;
///
/// assert_eq!(decrement(4, 11), 3);
/// assert_eq!(decrement(0, 11), 10);
/// ```
#[inline]
pub const fn decrement(n: usize, modulus: usize) -> usize {
    (n + modulus - 1) % modulus
}

/// Number of forward steps from `from` to `to` on a ring of size `modulus`.
#[inline]
pub const fn distance(from: usize, to: usize, modulus: usize) -> usize {
    (to + modulus - from) % modulus
}
