//! Property-based tests checking the map against `BTreeMap`.
//!
//! - Insert-then-lookup: every inserted key is retrievable, first value wins
//! - Remove-then-lookup: removed keys are gone
//! - Ordering: iteration yields strictly increasing keys in both directions
//! - Balance: height stays within the AVL bound
//! - Oracle comparison: random operation sequences match `BTreeMap`

use avlmap::{AvlTreeMap, ReverseOrder};
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Strategies
// =============================================================================

fn key_value_pairs(max_len: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((any::<i32>(), any::<i32>()), 0..max_len)
}

fn unique_keys(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::hash_set(any::<i32>(), 0..max_len).prop_map(|s| s.into_iter().collect())
}

#[derive(Debug, Clone)]
enum Op {
    Insert(i16, i32),
    Remove(i16),
    RemoveAtCursor(i16),
    Lookup(i16),
    PopFirst,
    PopLast,
}

// Narrow keys so removals and lookups hit existing entries often
fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    let key = -64i16..64;
    prop::collection::vec(
        prop_oneof![
            4 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => key.clone().prop_map(Op::Remove),
            2 => key.clone().prop_map(Op::RemoveAtCursor),
            2 => key.prop_map(Op::Lookup),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ],
        0..max_ops,
    )
}

/// Upper bound on the height of an AVL tree with `len` nodes, rounded up slightly.
fn max_avl_height(len: usize) -> usize {
    (1.45 * ((len + 2) as f64).log2()).floor() as usize
}

fn assert_sorted<K: Ord + std::fmt::Debug, V>(map: &AvlTreeMap<K, V>) -> Result<(), TestCaseError> {
    let keys: Vec<&K> = map.keys().collect();
    for pair in keys.windows(2) {
        prop_assert!(pair[0] < pair[1], "keys out of order: {:?}", pair);
    }
    let mut reversed: Vec<&K> = map.keys().rev().collect();
    reversed.reverse();
    prop_assert_eq!(keys, reversed);
    Ok(())
}

// =============================================================================
// Lookup properties
// =============================================================================

proptest! {
    #[test]
    fn insert_then_lookup(entries in key_value_pairs(500)) {
        let mut map = AvlTreeMap::new();
        let mut expected = BTreeMap::new();

        for (k, v) in &entries {
            let (cursor, inserted) = map.insert(*k, *v);
            prop_assert_eq!(cursor.key(), Some(k));
            prop_assert_eq!(inserted, !expected.contains_key(k));
            expected.entry(*k).or_insert(*v);
        }

        for (k, v) in &expected {
            prop_assert_eq!(map.get(k), Some(v), "key {} should keep its first value", k);
        }
        prop_assert_eq!(map.len(), expected.len());
        assert_sorted(&map)?;
    }

    #[test]
    fn remove_then_lookup(keys in unique_keys(200)) {
        let mut map: AvlTreeMap<i32, i32> = keys.iter().map(|k| (*k, k.wrapping_mul(3))).collect();

        for (removed, k) in keys.iter().enumerate() {
            prop_assert_eq!(map.remove(k), Some(k.wrapping_mul(3)));
            prop_assert!(!map.contains_key(k));
            prop_assert!(map.find(k).is_end());
            prop_assert_eq!(map.len(), keys.len() - removed - 1);
        }
        prop_assert!(map.is_empty());
        prop_assert_eq!(map.height(), 0);
    }
}

// =============================================================================
// Shape properties
// =============================================================================

proptest! {
    #[test]
    fn height_stays_logarithmic(keys in unique_keys(1000)) {
        let mut map = AvlTreeMap::new();
        for k in &keys {
            map.insert(*k, ());
            prop_assert!(map.height() <= max_avl_height(map.len()));
        }
        for k in keys.iter().step_by(2) {
            map.remove(k);
            prop_assert!(map.height() <= max_avl_height(map.len()));
        }
    }

    #[test]
    fn cursor_walk_matches_iteration(keys in unique_keys(300)) {
        let map: AvlTreeMap<i32, ()> = keys.iter().map(|k| (*k, ())).collect();

        let mut forward = Vec::new();
        let mut cursor = map.cursor_start();
        cursor.move_next();
        while let Some(k) = cursor.key() {
            forward.push(*k);
            cursor.move_next();
        }
        prop_assert!(cursor.is_end());
        prop_assert!(map.keys().copied().eq(forward.iter().copied()));

        let mut backward = Vec::new();
        let mut cursor = map.cursor_end();
        cursor.move_prev();
        while let Some(k) = cursor.key() {
            backward.push(*k);
            cursor.move_prev();
        }
        prop_assert!(cursor.is_start());
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn reverse_order_mirrors_natural(keys in unique_keys(200)) {
        let natural: AvlTreeMap<i32, ()> = keys.iter().map(|k| (*k, ())).collect();
        let mut reverse = AvlTreeMap::with_comparator(ReverseOrder);
        reverse.extend(keys.iter().map(|k| (*k, ())));

        prop_assert!(natural.keys().rev().eq(reverse.keys()));
    }
}

// =============================================================================
// Oracle comparison
// =============================================================================

proptest! {
    #[test]
    fn matches_btreemap(ops in operations(400)) {
        let mut map = AvlTreeMap::new();
        let mut expected = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let (_, inserted) = map.insert(k, v);
                    prop_assert_eq!(inserted, !expected.contains_key(&k));
                    expected.entry(k).or_insert(v);
                }
                Op::Remove(k) => {
                    prop_assert_eq!(map.remove(&k), expected.remove(&k));
                }
                Op::RemoveAtCursor(k) => {
                    let successor = expected.range(k + 1..).next().map(|(k, _)| *k);
                    let removed = expected.remove(&k).map(|v| (k, v));
                    let mut cursor = map.find_mut(&k);
                    prop_assert_eq!(cursor.remove_current(), removed);
                    if removed.is_some() {
                        prop_assert_eq!(cursor.key().copied(), successor);
                        prop_assert_eq!(cursor.is_end(), successor.is_none());
                    } else {
                        prop_assert!(cursor.is_end());
                    }
                }
                Op::Lookup(k) => {
                    prop_assert_eq!(map.get(&k), expected.get(&k));
                    prop_assert_eq!(map.at(&k).ok(), expected.get(&k));
                }
                Op::PopFirst => {
                    prop_assert_eq!(map.pop_first(), expected.pop_first());
                }
                Op::PopLast => {
                    prop_assert_eq!(map.pop_last(), expected.pop_last());
                }
            }
            prop_assert_eq!(map.len(), expected.len());
        }

        prop_assert!(map.iter().eq(expected.iter()));
        prop_assert_eq!(map.first_key_value(), expected.first_key_value());
        prop_assert_eq!(map.last_key_value(), expected.last_key_value());
        assert_sorted(&map)?;
    }
}
