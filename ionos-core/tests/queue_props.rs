//! Property tests for the event queue

use std::collections::VecDeque;

use ionos_core::{Event, EventQueue, EventType, QueueError};
use proptest::prelude::*;

const CAPACITY: usize = 8;

#[derive(Debug, Clone)]
enum Op {
    Post(u32),
    Dequeue,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Post),
        2 => Just(Op::Dequeue),
    ]
}

proptest! {
    #[test]
    fn fifo_and_capacity_hold(ops in prop::collection::vec(op(), 0..200)) {
        let queue: EventQueue<CAPACITY> = EventQueue::new();
        let mut model: VecDeque<u32> = VecDeque::new();
        let mut drops = 0u32;

        for op in ops {
            match op {
                Op::Post(n) => {
                    let before = queue.peek();
                    let result = queue.post(Event::new(EventType::Custom).with_data(n, 0));
                    if model.len() == CAPACITY {
                        prop_assert_eq!(result, Err(QueueError::Full));
                        prop_assert_eq!(queue.peek(), before);
                        drops += 1;
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.push_back(n);
                    }
                }
                Op::Dequeue => {
                    let got = queue.dequeue().map(|event| event.data1);
                    prop_assert_eq!(got, model.pop_front());
                }
            }

            prop_assert!(queue.len() <= queue.capacity());
            prop_assert_eq!(queue.len(), model.len());
        }

        prop_assert_eq!(queue.dropped_count(), drops);
        while let Some(expected) = model.pop_front() {
            prop_assert_eq!(queue.dequeue().map(|event| event.data1), Some(expected));
        }
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn high_water_never_exceeds_capacity(posts in 0usize..32) {
        let queue: EventQueue<CAPACITY> = EventQueue::new();
        for n in 0..posts {
            let _ = queue.post(Event::new(EventType::Custom).with_data(n as u32, 0));
        }

        let stats = queue.stats();
        prop_assert_eq!(stats.high_water, posts.min(CAPACITY));
        prop_assert_eq!(stats.dropped as usize, posts.saturating_sub(CAPACITY));
    }
}
