use std::collections::BTreeSet;

use ostreap::{Error, OSTreapSet, Rank};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

/// Generates values in a range that ensures collisions.
fn value_strategy() -> impl Strategy<Value = i64> {
    -10_000i64..10_000i64
}

fn keys<C, R>(set: &OSTreapSet<i64, C, R>) -> Vec<i64> {
    set.iter().copied().collect()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i64),
    Remove(i64),
    Contains(i64),
    RemoveAtRank(usize),
    First,
    Last,
    PopFirst,
    PopLast,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        5 => value_strategy().prop_map(SetOp::Insert),
        3 => value_strategy().prop_map(SetOp::Remove),
        2 => value_strategy().prop_map(SetOp::Contains),
        1 => any::<usize>().prop_map(SetOp::RemoveAtRank),
        1 => Just(SetOp::First),
        1 => Just(SetOp::Last),
        1 => Just(SetOp::PopFirst),
        1 => Just(SetOp::PopLast),
    ]
}

// ─── Differential tests against BTreeSet ─────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both OSTreapSet and BTreeSet and
    /// asserts identical results at every step.
    #[test]
    fn set_ops_match_btreeset(seed in any::<u64>(), ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        let mut os_set: OSTreapSet<i64> = OSTreapSet::with_seed(seed);
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for op in &ops {
            match op {
                SetOp::Insert(v) => {
                    prop_assert_eq!(os_set.insert(*v), bt_set.insert(*v), "insert({})", v);
                }
                SetOp::Remove(v) => {
                    prop_assert_eq!(os_set.remove(v), bt_set.remove(v), "remove({})", v);
                }
                SetOp::Contains(v) => {
                    prop_assert_eq!(os_set.contains(v), bt_set.contains(v), "contains({})", v);
                }
                SetOp::RemoveAtRank(which) => {
                    if bt_set.is_empty() {
                        continue;
                    }
                    let rank = which % bt_set.len();
                    let expected = *bt_set.iter().nth(rank).unwrap();
                    bt_set.remove(&expected);
                    let position = os_set.select(rank).position();
                    prop_assert_eq!(os_set.remove_at(position), Ok(expected), "remove_at(rank {})", rank);
                }
                SetOp::First => {
                    prop_assert_eq!(os_set.first(), bt_set.first(), "first()");
                }
                SetOp::Last => {
                    prop_assert_eq!(os_set.last(), bt_set.last(), "last()");
                }
                SetOp::PopFirst => {
                    prop_assert_eq!(os_set.pop_first(), bt_set.pop_first(), "pop_first()");
                }
                SetOp::PopLast => {
                    prop_assert_eq!(os_set.pop_last(), bt_set.pop_last(), "pop_last()");
                }
            }
            prop_assert_eq!(os_set.len(), bt_set.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(os_set.is_empty(), bt_set.is_empty(), "is_empty mismatch after {:?}", op);
        }

        let bt_items: Vec<_> = bt_set.into_iter().collect();
        prop_assert_eq!(keys(&os_set), bt_items);
    }

    /// Tests that iteration order matches BTreeSet in both directions.
    #[test]
    fn iter_matches_btreeset(values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE)) {
        let os_set: OSTreapSet<i64> = values.iter().copied().collect();
        let bt_set: BTreeSet<i64> = values.iter().copied().collect();

        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        prop_assert_eq!(&keys(&os_set), &bt_items, "iter() mismatch");

        let os_rev: Vec<_> = os_set.iter().rev().copied().collect();
        let bt_rev: Vec<_> = bt_set.iter().rev().copied().collect();
        prop_assert_eq!(&os_rev, &bt_rev, "iter().rev() mismatch");

        let os_into: Vec<_> = os_set.clone().into_iter().collect();
        prop_assert_eq!(&os_into, &bt_items, "into_iter() mismatch");
        prop_assert_eq!(os_set.iter().len(), bt_set.len());
    }

    /// Inserting keys one by one and bulk-building agree.
    #[test]
    fn insert_and_collect_agree(seed in any::<u64>(), values in proptest::collection::vec(value_strategy(), 0..1_000)) {
        let mut one_by_one = OSTreapSet::with_seed(seed);
        for &v in &values {
            one_by_one.insert(v);
        }
        let collected: OSTreapSet<i64> = values.into_iter().collect();
        prop_assert_eq!(one_by_one, collected);
    }

    /// For every rank k, `rank_of(select(k)) == k`.
    #[test]
    fn rank_of_inverts_select(values in proptest::collection::vec(value_strategy(), 1..2_000)) {
        let os_set: OSTreapSet<i64> = values.iter().copied().collect();

        for rank in 0..os_set.len() {
            let cursor = os_set.select(rank);
            prop_assert_eq!(cursor.rank(), rank);
            let key = cursor.key().unwrap();
            prop_assert_eq!(os_set.rank_of(key), Some(rank));
            prop_assert_eq!(&os_set[Rank(rank)], key);
        }
        prop_assert!(os_set.select(os_set.len()).is_end());
    }

    /// lower_bound/upper_bound match BTreeSet ranges.
    #[test]
    fn bounds_match_btreeset(values in proptest::collection::vec(value_strategy(), 0..1_000), probe in value_strategy()) {
        let os_set: OSTreapSet<i64> = values.iter().copied().collect();
        let bt_set: BTreeSet<i64> = values.iter().copied().collect();

        prop_assert_eq!(os_set.lower_bound(&probe).key(), bt_set.range(probe..).next());
        prop_assert_eq!(os_set.upper_bound(&probe).key(), bt_set.range(probe + 1..).next());

        if os_set.contains(&probe) {
            let mut found = os_set.find(&probe);
            found.move_next();
            prop_assert_eq!(found, os_set.upper_bound(&probe));
        } else {
            prop_assert!(os_set.find(&probe).is_end());
        }
    }

    /// split_off and append partition and reassemble the keys.
    #[test]
    fn split_off_then_append(values in proptest::collection::vec(value_strategy(), 0..1_000), at in value_strategy()) {
        let mut low: OSTreapSet<i64> = values.iter().copied().collect();
        let bt_set: BTreeSet<i64> = values.iter().copied().collect();

        let mut high = low.split_off(&at);
        let bt_low: Vec<_> = bt_set.range(..at).copied().collect();
        let bt_high: Vec<_> = bt_set.range(at..).copied().collect();
        prop_assert_eq!(keys(&low), bt_low);
        prop_assert_eq!(keys(&high), bt_high);

        low.append(&mut high);
        prop_assert!(high.is_empty());
        prop_assert_eq!(keys(&low), bt_set.into_iter().collect::<Vec<_>>());
    }

    /// Tests retain matches BTreeSet.
    #[test]
    fn retain_matches_btreeset(values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE)) {
        let mut os_set: OSTreapSet<i64> = values.iter().copied().collect();
        let mut bt_set: BTreeSet<i64> = values.iter().copied().collect();

        os_set.retain(|v| v % 3 != 0);
        bt_set.retain(|v| v % 3 != 0);
        prop_assert_eq!(keys(&os_set), bt_set.into_iter().collect::<Vec<_>>());
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn small_set_walkthrough() {
    let mut set = OSTreapSet::new();
    for key in [5, 3, 8, 1] {
        set.insert(key);
    }
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 8]);

    assert_eq!(set.select(0).key(), Some(&1));
    assert_eq!(set.select(3).key(), Some(&8));
    assert_eq!(set.select(4), set.end());
    assert_eq!(set.lower_bound(&4).key(), Some(&5));
    assert_eq!(set.upper_bound(&5).key(), Some(&8));

    assert!(set.remove(&3));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 5, 8]);
    assert_eq!(set.len(), 3);
}

#[test]
fn empty_set_queries() {
    let set: OSTreapSet<i32> = OSTreapSet::new();
    assert_eq!(set.begin(), set.end());
    assert_eq!(set.rbegin(), set.rend());
    assert!(!set.contains(&0));
    assert_eq!(set.select(0), set.end());
    assert!(set.lower_bound(&0).is_end());
    assert!(set.upper_bound(&0).is_end());
    assert_eq!(set.first(), None);
    assert_eq!(set.rank_of(&0), None);
    assert_eq!(set.iter().next(), None);
}

#[test]
fn reinserting_present_key_is_noop() {
    let mut set = OSTreapSet::from([4, 2, 6]);
    let before: Vec<_> = set.iter().copied().collect();
    assert!(!set.insert(2));
    assert_eq!(set.len(), 3);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), before);
}

#[test]
fn equivalent_keys_collapse() {
    let mut set = OSTreapSet::with_compare(|a: &String, b: &String| a.to_lowercase() < b.to_lowercase());
    assert!(set.insert(String::from("Apple")));
    assert!(!set.insert(String::from("APPLE")));
    assert!(set.insert(String::from("banana")));

    assert_eq!(set.len(), 2);
    assert_eq!(set.get(&String::from("apple")).map(String::as_str), Some("Apple"));
    assert_eq!(set.take(&String::from("APPLE")).as_deref(), Some("Apple"));
    assert_eq!(set.iter().map(String::as_str).collect::<Vec<_>>(), ["banana"]);
}

#[test]
fn remove_at_reports_errors() {
    let mut set = OSTreapSet::from([1, 2, 3]);
    let other = OSTreapSet::from([1, 2, 3]);

    assert_eq!(set.remove_at(set.end().position()), Err(Error::EndPosition));
    assert_eq!(set.remove_at(set.rend().position()), Err(Error::EndPosition));
    assert_eq!(set.remove_at(other.find(&2).position()), Err(Error::ForeignPosition));

    let two = set.find(&2).position();
    let three = set.find(&3).position();
    assert_eq!(set.remove_at(two), Ok(2));
    assert_eq!(set.remove_at(two), Err(Error::StalePosition));
    // Positions of other keys survive the removal.
    assert_eq!(set.remove_at(three), Ok(3));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1]);
    assert_eq!(Error::StalePosition.to_string(), "position refers to a removed key");
}

#[test]
fn positions_survive_unrelated_mutation() {
    let mut set: OSTreapSet<u32> = (0..100).collect();
    let position = set.find(&50).position();

    for key in 100..1_000 {
        set.insert(key);
    }
    for key in (0..50).step_by(2) {
        set.remove(&key);
    }
    assert_eq!(set.remove_at(position), Ok(50));
}

#[test]
fn positions_survive_retain() {
    let mut set: OSTreapSet<i32> = (0..10).collect();
    let kept = set.find(&4).position();
    let dropped = set.find(&5).position();

    set.retain(|k| k % 2 == 0);
    assert_eq!(set.remove_at(dropped), Err(Error::StalePosition));
    assert_eq!(set.remove_at(kept), Ok(4));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [0, 2, 6, 8]);
}

#[test]
fn positions_survive_split_off_and_append() {
    let mut low: OSTreapSet<i32> = (0..10).collect();
    let position = low.find(&2).position();

    let mut high = low.split_off(&5);
    low.append(&mut high);
    assert_eq!(low.remove_at(position), Ok(2));
}

#[test]
fn swap_is_complete() {
    let descending = |x: &i32, y: &i32| x > y;
    let mut a = OSTreapSet::with_compare(descending);
    let mut b = OSTreapSet::with_compare(descending);
    a.extend([1, 2, 3]);
    b.extend([9]);

    a.swap(&mut b);
    assert_eq!(a.iter().copied().collect::<Vec<_>>(), [9]);
    assert_eq!(b.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
}

#[test]
fn clear_resets_everything() {
    let mut set: OSTreapSet<i32> = (0..10).collect();
    let position = set.find(&3).position();
    set.clear();

    assert!(set.is_empty());
    assert_eq!(set.begin(), set.end());
    set.insert(3);
    // The slot may be reused, but the old position must not name the new key.
    assert_eq!(set.remove_at(position), Err(Error::StalePosition));
}

#[test]
fn seeded_sets_with_same_input_are_equal() {
    let a: OSTreapSet<i32> = {
        let mut set = OSTreapSet::with_seed(7);
        set.extend([3, 1, 2]);
        set
    };
    let b = OSTreapSet::from([1, 2, 3]);
    assert_eq!(a, b);
    assert_ne!(a, OSTreapSet::from([1, 2]));
    assert_eq!(format!("{a:?}"), "{1, 2, 3}");
}

#[test]
fn custom_rng_is_honoured() {
    let mut set = OSTreapSet::with_compare_and_rng(ostreap::Natural, SmallRng::seed_from_u64(11));
    set.extend(0..64);
    assert_eq!(set.len(), 64);
    assert_eq!(set.get_by_rank(63), Some(&63));
    let high = set.split_off_rank(60);
    assert_eq!(high.iter().copied().collect::<Vec<_>>(), [60, 61, 62, 63]);
}

#[test]
fn compare_returns_predicate() {
    let set = OSTreapSet::<u8, _>::with_compare(|a: &u8, b: &u8| a > b);
    assert!((set.compare())(&2, &1));
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn index_past_end_panics() {
    let set = OSTreapSet::from([1]);
    let _key: i32 = set[Rank(1)];
}
