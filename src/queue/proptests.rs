//! Property-based tests for the bounded queue using proptest
//!
//! A `VecDeque` bounded to the same capacity serves as the sequential model.

use super::BoundedQueue;
use crate::Error;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        7 => any::<i32>().prop_map(Op::Push),
        3 => Just(Op::Pop),
    ]
}

proptest! {
    #[test]
    fn test_fifo_ordering_single_thread(values in prop::collection::vec(any::<i32>(), 1..100)) {
        let queue = BoundedQueue::new(values.len());
        for &value in &values {
            prop_assert!(queue.push(value).is_ok());
        }
        for &expected in &values {
            prop_assert_eq!(queue.pop(), Some(expected));
        }
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn test_capacity_invariant(capacity in 1usize..64, extra in 1usize..32) {
        let queue = BoundedQueue::new(capacity);
        for i in 0..capacity {
            prop_assert!(queue.push(i).is_ok());
        }
        for i in 0..extra {
            prop_assert_eq!(queue.push(capacity + i), Err(Error::CapacityExceeded));
        }
        prop_assert_eq!(queue.len(), capacity);
        prop_assert_eq!(queue.pop_batch(capacity + extra), (0..capacity).collect::<Vec<_>>());
    }

    #[test]
    fn test_matches_sequential_model(
        capacity in 1usize..16,
        ops in prop::collection::vec(op_strategy(), 1..300)
    ) {
        let queue = BoundedQueue::new(capacity);
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    let result = queue.push(value);
                    if model.len() < capacity {
                        prop_assert!(result.is_ok());
                        model.push_back(value);
                    } else {
                        prop_assert_eq!(result, Err(Error::CapacityExceeded));
                    }
                }
                Op::Pop => prop_assert_eq!(queue.pop(), model.pop_front()),
            }
            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.is_empty(), model.is_empty());
        }
    }

    #[test]
    fn test_wrap_around_behavior(capacity in 1usize..16, rounds in 1usize..50) {
        let queue = BoundedQueue::new(capacity);
        let mut next = 0usize;
        let mut expected = 0usize;

        // Cumulative traffic well past the ring size
        for _ in 0..rounds {
            let burst = (next % capacity) + 1;
            for _ in 0..burst {
                prop_assert!(queue.push(next).is_ok());
                next += 1;
            }
            prop_assert_eq!(queue.len(), burst);
            while let Some(value) = queue.pop() {
                prop_assert_eq!(value, expected);
                expected += 1;
            }
        }
        prop_assert_eq!(expected, next);
    }

    #[test]
    fn test_idempotent_drain(pops in 1usize..50) {
        let queue: BoundedQueue<u8> = BoundedQueue::new(4);
        for _ in 0..pops {
            prop_assert_eq!(queue.pop(), None);
            prop_assert!(queue.is_empty());
        }
    }

    #[test]
    fn test_no_values_leak_on_drop(capacity in 1usize..32, pushes in 0usize..32, pops in 0usize..32) {
        let tracker = Arc::new(());
        {
            let queue = BoundedQueue::new(capacity);
            for _ in 0..pushes {
                let _ = queue.push(Arc::clone(&tracker));
            }
            for _ in 0..pops {
                queue.pop();
            }
        }
        prop_assert_eq!(Arc::strong_count(&tracker), 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_concurrent_spsc_conservation(capacity in 1usize..16, count in 1usize..2_000) {
        let queue = Arc::new(BoundedQueue::new(capacity));

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..count {
                    while queue.push(i).is_err() {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut received = Vec::with_capacity(count);
        while received.len() < count {
            if let Some(value) = queue.pop() {
                received.push(value);
            }
        }
        producer.join().unwrap();

        prop_assert_eq!(received, (0..count).collect::<Vec<_>>());
        prop_assert!(queue.is_empty());
    }
}
