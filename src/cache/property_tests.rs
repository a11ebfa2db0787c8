//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the bookkeeping invariants of the store under
//! arbitrary operation sequences.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

use crate::cache::{CacheConfig, CacheStore, ManualClock};
use crate::keys::generate_stats_key;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 20;
const TEST_MAX_MEMORY: usize = 2_000;

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates payloads of varying size, some near the entry limit
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-z]{0,600}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Advance { ms: u64 },
    Cleanup,
    ClearByPattern { pattern: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => (0u64..80).prop_map(|ms| CacheOp::Advance { ms }),
        1 => Just(CacheOp::Cleanup),
        1 => "[a-e]".prop_map(|pattern| CacheOp::ClearByPattern { pattern }),
    ]
}

fn test_store() -> (CacheStore<Value>, ManualClock) {
    let clock = ManualClock::new(1_000);
    let config = CacheConfig::default()
        .with_ttl(Duration::from_millis(100))
        .with_max_size(TEST_MAX_ENTRIES)
        .with_max_memory_size(TEST_MAX_MEMORY);
    let store = CacheStore::builder(config).clock(clock.clone()).build();
    (store, clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any operation sequence, the memory total equals the sum of live
    // entry sizes and the recency order tracks exactly the stored keys.
    #[test]
    fn prop_bookkeeping_invariants(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (mut store, clock) = test_store();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => { store.set(key, json!(value)); }
                CacheOp::Get { key } => { store.get(&key); }
                CacheOp::Delete { key } => { store.delete(&key); }
                CacheOp::Advance { ms } => clock.advance(ms),
                CacheOp::Cleanup => { store.cleanup(); }
                CacheOp::ClearByPattern { pattern } => { store.clear_by_pattern(&pattern); }
            }

            let keys = store.keys();
            prop_assert_eq!(keys.len(), store.len(), "Recency order and store diverged");

            let mut sizes = 0;
            for key in &keys {
                let entry = store.entry(key);
                prop_assert!(entry.is_some(), "Tracked key '{}' has no entry", key);
                sizes += entry.map_or(0, |e| e.size);
            }
            prop_assert_eq!(sizes, store.memory_usage(), "Memory total drifted");
            prop_assert!(store.len() <= TEST_MAX_ENTRIES);
        }
    }

    // Any value larger than half the ceiling is never stored.
    #[test]
    fn prop_oversized_never_stored(key in key_strategy(), extra in 0usize..200) {
        let (mut store, _) = test_store();
        store.set("resident", json!("r"));
        let before = store.memory_usage();

        // Each character costs 2 bytes, plus 2 quote characters
        let chars = TEST_MAX_MEMORY / 4 + extra;
        prop_assert!(!store.set(key.clone(), json!("x".repeat(chars))));
        prop_assert!(!store.has(&key));
        prop_assert_eq!(store.memory_usage(), before);
    }

    // Filling past capacity evicts exactly the least recently touched key.
    #[test]
    fn prop_lru_eviction_order(
        keys in prop::collection::hash_set("[a-z]{3,8}", 3..10),
        touched in 0usize..100,
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len();
        let clock = ManualClock::new(0);
        let mut store: CacheStore<Value> = CacheStore::builder(
            CacheConfig::default().with_max_size(capacity),
        )
        .clock(clock)
        .build();

        for key in &keys {
            store.set(key.clone(), json!(key));
        }

        // Touching one key moves the eviction candidate along
        let promoted = &keys[touched % capacity];
        store.get(promoted);
        let expected_victim = keys.iter().find(|k| *k != promoted).cloned().unwrap();

        store.set("new_key_!", json!(0));

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(!store.has(&expected_victim));
        prop_assert!(store.has(promoted));
        let survivors: HashSet<String> = store.keys().into_iter().collect();
        prop_assert!(survivors.contains("new_key_!"));
    }

    // Parameter order never changes the generated key.
    #[test]
    fn prop_stats_key_order_independent(
        params in prop::collection::btree_map("[a-z]{1,6}", 0i64..1000, 0..6)
    ) {
        let forward: Vec<(String, Value)> =
            params.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        prop_assert_eq!(
            generate_stats_key("dim", forward),
            generate_stats_key("dim", reversed)
        );
    }
}
