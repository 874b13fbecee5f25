//! Ring store behaviour against a reference model
//!
//! Random append / mark-sent sequences are replayed on a small store and on a
//! `VecDeque` model; contents, order and pending set must agree.

#![cfg(test)]

use std::collections::VecDeque;

use glucowatch_core::buffer::{DeliveryState, RingStore};
use glucowatch_core::MeasurementRecord;
use proptest::prelude::*;

const CAPACITY: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Append(f32),
    /// Mark the n-th id ever issued (may be overwritten already)
    MarkSent(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (20.0f32..600.0).prop_map(Op::Append),
        1 => (0usize..40).prop_map(Op::MarkSent),
    ]
}

proptest! {
    #[test]
    fn store_matches_model(ops in prop::collection::vec(op(), 0..60)) {
        let mut store = RingStore::<CAPACITY>::new();
        let mut model: VecDeque<(u64, f32, bool)> = VecDeque::new();
        let mut ids = Vec::new();

        for op in ops {
            match op {
                Op::Append(glucose) => {
                    let seq = ids.len() as u64;
                    let record = MeasurementRecord::new(seq * 60_000, glucose, 33.0, 70).unwrap();
                    ids.push(store.append(record));

                    if model.len() == CAPACITY {
                        model.pop_front();
                    }
                    model.push_back((seq, glucose, false));
                }
                Op::MarkSent(n) => {
                    if let Some(&id) = ids.get(n) {
                        store.mark_sent(id);
                        store.mark_sent(id);
                        if let Some(entry) = model.iter_mut().find(|entry| entry.0 == id.sequence()) {
                            entry.2 = true;
                        }
                    }
                }
            }
        }

        let stored: Vec<f32> = store.iter().map(MeasurementRecord::glucose_mg_dl).collect();
        let expected: Vec<f32> = model.iter().map(|entry| entry.1).collect();
        prop_assert_eq!(stored, expected);

        let pending: Vec<u64> = store.pending_unsent().map(|(id, _)| id.sequence()).collect();
        let expected: Vec<u64> = model.iter().filter(|entry| !entry.2).map(|entry| entry.0).collect();
        prop_assert_eq!(pending, expected);

        for id in &ids {
            let live = model.iter().find(|entry| entry.0 == id.sequence());
            let expected = live.map(|entry| {
                if entry.2 { DeliveryState::Sent } else { DeliveryState::Pending }
            });
            prop_assert_eq!(store.state(*id), expected);
        }

        prop_assert_eq!(store.total_written(), ids.len() as u64);
        prop_assert_eq!(store.verified().count(), store.len());
    }
}
