//! Generated operation sequences for `ExclusionSet`, checked against a
//! `HashMap` that holds the same entries.
//!
//! After every operation the table must agree with the model on:
//!
//! 1. `exists` and `get` for every key in the range.
//! 2. `len`.
//! 3. The value `remove` hands back.

use std::collections::HashMap;

use proptest::prelude::*;
use sudoku_link_core::ExclusionSet;

const KEY_RANGE: usize = 96;

#[derive(Debug, Clone)]
enum Op {
    Set(usize, u16),
    Remove(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..KEY_RANGE, any::<u16>()).prop_map(|(k, v)| Op::Set(k, v)),
        4 => (0..KEY_RANGE).prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn table_matches_hashmap_model(
        buckets in 1usize..40,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let mut table: ExclusionSet<usize, u16> = ExclusionSet::with_buckets(buckets).unwrap();
        let mut model: HashMap<usize, u16> = HashMap::new();

        for op in &ops {
            match *op {
                Op::Set(key, value) => {
                    table.set(key, value);
                    model.insert(key, value);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(table.remove(key), model.remove(&key), "remove {}", key);
                }
                Op::Clear => {
                    table.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(table.len(), model.len());
            for key in 0..KEY_RANGE {
                prop_assert_eq!(table.exists(key), model.contains_key(&key), "exists {}", key);
                prop_assert_eq!(table.get(key), model.get(&key), "get {}", key);
            }
        }
    }

    #[test]
    fn iter_yields_each_live_entry_once(
        keys in prop::collection::vec(0..KEY_RANGE, 0..120),
    ) {
        let mut table: ExclusionSet<usize, usize> = ExclusionSet::with_buckets(7).unwrap();
        for &key in &keys {
            table.set(key, key * 2);
        }

        let mut seen: Vec<(usize, usize)> = table.iter().map(|(k, v)| (k, *v)).collect();
        seen.sort_unstable();
        let mut expected: Vec<(usize, usize)> = keys.iter().map(|&k| (k, k * 2)).collect();
        expected.sort_unstable();
        expected.dedup();

        prop_assert_eq!(seen, expected);
    }
}
