//! Property tests for container admission and daemon batching.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use access_audit::{AccessKind, AuditContainer, AuditEntry, BufferingDaemon};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put,
    PutAll(usize),
    Pull,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Put),
        3 => (0usize..40).prop_map(Op::PutAll),
        1 => Just(Op::Pull),
    ]
}

fn entry(id: usize) -> AuditEntry {
    AuditEntry::new(id.to_string(), AccessKind::Write, "prop")
}

proptest! {
    /// Property: occupancy never exceeds capacity and every admitted entry
    /// is pulled exactly once, in admission order.
    #[test]
    fn proptest_capacity_and_exactly_once(
        capacity in 1usize..32,
        ops in prop::collection::vec(arb_op(), 1..60)
    ) {
        let container = AuditContainer::new(capacity).unwrap();
        let mut next_id = 0usize;
        let mut model: Vec<String> = Vec::new();
        let mut pulled: Vec<String> = Vec::new();
        let mut expected: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Put => {
                    if model.len() < capacity {
                        model.push(next_id.to_string());
                    }
                    container.put(entry(next_id));
                    next_id += 1;
                }
                Op::PutAll(n) => {
                    let batch: Vec<_> = (next_id..next_id + n).map(entry).collect();
                    for id in next_id..next_id + n {
                        if model.len() < capacity {
                            model.push(id.to_string());
                        }
                    }
                    next_id += n;
                    container.put_all(batch);
                }
                Op::Pull => {
                    let drained = container.pull_timeout(Duration::ZERO);
                    prop_assert!(drained.len() <= capacity);
                    pulled.extend(drained.iter().map(|e| e.path().to_string()));
                    expected.append(&mut model);
                }
            }
            prop_assert!(container.len() <= capacity);
            prop_assert_eq!(container.len(), model.len());
        }

        let rest = container.pull_timeout(Duration::ZERO);
        pulled.extend(rest.iter().map(|e| e.path().to_string()));
        expected.append(&mut model);

        prop_assert_eq!(&pulled, &expected);
        prop_assert_eq!(container.dropped() as usize, next_id - expected.len());
    }

    /// Property: a backlog is dispatched as full batches followed by at most
    /// one short batch, preserving order with no gaps or overlaps.
    #[test]
    fn proptest_batches_partition_backlog(
        count in 0usize..200,
        batch_size in 1usize..40
    ) {
        let container = Arc::new(AuditContainer::new(200).unwrap());
        container.put_all((0..count).map(entry));
        let batches = Arc::new(Mutex::new(Vec::<Vec<AuditEntry>>::new()));
        let sink = Arc::clone(&batches);

        let handle = BufferingDaemon::new(
            Arc::clone(&container),
            move |batch: Vec<AuditEntry>| sink.lock().unwrap().push(batch),
            batch_size,
            Duration::from_secs(3600),
        )
        .unwrap()
        .spawn()
        .unwrap();
        handle.shutdown();

        let batches = batches.lock().unwrap();
        let (last, full) = match batches.split_last() {
            Some(split) => split,
            None => {
                prop_assert_eq!(count, 0);
                return Ok(());
            }
        };
        prop_assert!(full.iter().all(|b| b.len() == batch_size));
        prop_assert!(!last.is_empty() && last.len() <= batch_size);

        let paths: Vec<String> = batches.iter().flatten().map(|e| e.path().to_string()).collect();
        let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        prop_assert_eq!(paths, expected);
    }
}
