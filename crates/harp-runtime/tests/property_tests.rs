//! Property tests over the queue and connection graph.

use harp_auth::{Context, EntityCriteria};
use harp_event::Message;
use harp_runtime::testing::{Profile, TestBench};
use harp_runtime::{ComponentBuilder, MessageQueue, PriorityFn};
use harp_types::{ComponentId, ErrorCode};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn keyed_queue() -> MessageQueue {
    let by_key: PriorityFn = Arc::new(|m: &Message| {
        m.key().and_then(|k| k.parse().ok()).unwrap_or(i64::MAX)
    });
    MessageQueue::with_priority("q", by_key, None)
}

fn keyed(k: i64) -> Message {
    Message::new(ComponentId::new("src"), "get", Context::system()).with_key(k.to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every pushed message pops exactly once, in ascending (key, push order).
    #[test]
    fn queue_pops_each_message_once_in_priority_order(keys in prop::collection::vec(-50i64..50, 0..64)) {
        let q = keyed_queue();
        let mut pushed = Vec::new();
        for (seq, k) in keys.iter().enumerate() {
            let m = keyed(*k);
            pushed.push((*k, seq, m.id()));
            q.push_message(m).unwrap();
        }

        let popped: Vec<_> = std::iter::from_fn(|| q.pop_next_message()).map(|m| m.id()).collect();

        pushed.sort_by_key(|(k, seq, _)| (*k, *seq));
        let expected: Vec<_> = pushed.into_iter().map(|(_, _, id)| id).collect();
        prop_assert_eq!(popped, expected);
        prop_assert!(q.is_empty());
    }

    /// Interleaved pushes and pops never surface a lower-priority message
    /// while a higher-priority one is waiting.
    #[test]
    fn interleaved_pops_respect_priority(ops in prop::collection::vec(prop::option::of(-20i64..20), 1..80)) {
        let q = keyed_queue();
        let mut waiting: Vec<i64> = Vec::new();
        let mut seen = HashSet::new();

        for op in ops {
            match op {
                Some(k) => {
                    q.push_message(keyed(k)).unwrap();
                    waiting.push(k);
                }
                None => {
                    let popped = q.pop_next_message();
                    match waiting.iter().copied().min() {
                        None => prop_assert!(popped.is_none()),
                        Some(min) => {
                            let m = popped.expect("queue not empty");
                            let k: i64 = m.key().unwrap().parse().unwrap();
                            prop_assert_eq!(k, min);
                            prop_assert!(seen.insert(m.id()));
                            let pos = waiting.iter().position(|w| *w == min).unwrap();
                            waiting.remove(pos);
                        }
                    }
                }
            }
        }
        prop_assert_eq!(q.len(), waiting.len());
    }

    /// connect succeeds iff the entity is registered and the criteria pass;
    /// disconnect mirrors it.
    #[test]
    fn connect_iff_registered_and_allowed(
        registered in prop::collection::btree_set("[a-e]", 0..5),
        allowed in prop::collection::btree_set("[a-e]", 0..5),
        target in "[a-e]",
    ) {
        let bench = TestBench::new();
        for name in &registered {
            bench.component(name, Profile::Permissive).unwrap();
        }
        let criteria = EntityCriteria::allow_list(allowed.iter().cloned());
        let mut me = bench
            .build(
                ComponentBuilder::new("self")
                    .connection_criteria(criteria.clone(), false)
                    .disconnection_criteria(criteria, false),
            )
            .unwrap();

        let ctx = Context::system();
        let should_connect = registered.contains(&target) && allowed.contains(&target);
        let result = me.connect_entity(&target, &ctx);
        prop_assert_eq!(result.is_ok(), should_connect);
        prop_assert_eq!(me.is_connected(&target), should_connect);

        if let Err(e) = result {
            let expected = if allowed.contains(&target) {
                "COMPONENT_ENTITY_NOT_FOUND"
            } else {
                "COMPONENT_CRITERIA_NOT_SATISFIED"
            };
            prop_assert_eq!(e.code(), expected);
        }

        let result = me.disconnect_entity(&target, &ctx);
        prop_assert_eq!(result.is_ok(), should_connect);
        prop_assert!(!me.is_connected(&target));
    }
}
