use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

fn validate_index(t: &NameTree) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:?}");
}

fn validate_tags(t: &TagTree) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:?}");
    assert_eq!(
        t.node_count() - t.vacant_count(),
        t.len(),
        "live count must match nodes minus vacant slots"
    );
}

#[derive(Clone, Debug)]
enum Op {
    Insert(String, Tag, bool),
    Remove(String, Tag),
    Get(String, Tag),
    Rebalance,
}

fn name_strategy() -> impl Strategy<Value = String> + Clone {
    // A handful of names so that tag trees grow deep enough to rebuild.
    prop::sample::select(vec!["alice", "bob", "carol", "dave", "eve", "mallory"])
        .prop_map(str::to_owned)
}

fn tag_strategy() -> impl Strategy<Value = Tag> + Clone {
    0u16..256
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let name = name_strategy();
    let tag = tag_strategy();
    let op = prop_oneof![
        50 => (name.clone(), tag.clone(), any::<bool>()).prop_map(|(n, t, f)| Op::Insert(n, t, f)),
        30 => (name.clone(), tag.clone()).prop_map(|(n, t)| Op::Remove(n, t)),
        19 => (name.clone(), tag.clone()).prop_map(|(n, t)| Op::Get(n, t)),
        1 => Just(Op::Rebalance),
    ];
    prop::collection::vec(op, 0..=2000)
}

fn tag_ops_strategy() -> impl Strategy<Value = Vec<(bool, Tag)>> {
    // (true, tag) inserts, (false, tag) removes.
    prop::collection::vec((prop::bool::weighted(0.6), 0u16..128), 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_index(ops in ops_strategy()) {
        let mut t = NameTree::new();
        let mut m: BTreeMap<(String, Tag), Record> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(name, tag, flag) => {
                    let record = Record::new(name.clone(), tag, flag, "badge", "status");
                    let key = (name, tag);
                    let expected = !m.contains_key(&key);
                    if expected {
                        m.insert(key, record.clone());
                    }
                    prop_assert_eq!(t.insert(record), expected);
                }
                Op::Remove(name, tag) => {
                    let got = t.remove(&name, tag);
                    let expected = m.remove(&(name, tag));
                    prop_assert_eq!(got, expected);
                }
                Op::Get(name, tag) => {
                    let got = t.get_record(&name, tag);
                    let expected = m.get(&(name, tag));
                    prop_assert_eq!(got, expected);
                }
                Op::Rebalance => {
                    t.rebalance();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_index(&t);
        let got: Vec<&Record> = t.iter().collect();
        let expected: Vec<&Record> = m.values().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_tag_tree_invariants(ops in tag_ops_strategy()) {
        let mut t = TagTree::new();
        let mut live = std::collections::BTreeSet::new();

        for (insert, tag) in ops {
            if insert {
                let record = Record::new("alice", tag, false, "b", "s");
                prop_assert_eq!(t.insert(record), live.insert(tag));
            } else {
                prop_assert_eq!(t.remove(tag).is_some(), live.remove(&tag));
            }
            validate_tags(&t);
        }

        let before: Vec<Tag> = t.iter().map(Record::tag).collect();
        let vacant = t.vacant_count();
        prop_assert_eq!(t.rebalance(), vacant);
        prop_assert_eq!(t.vacant_count(), 0);
        prop_assert_eq!(t.node_count(), before.len());
        let after: Vec<Tag> = t.iter().map(Record::tag).collect();
        prop_assert_eq!(&before, &after);
        prop_assert_eq!(after, live.into_iter().collect::<Vec<_>>());
        validate_tags(&t);
    }

    #[test]
    fn prop_clone_matches(ops in tag_ops_strategy()) {
        let mut t = TagTree::new();
        for (insert, tag) in ops {
            if insert {
                t.insert(Record::new("alice", tag, true, "b", "s"));
            } else {
                t.remove(tag);
            }
        }
        let copy = t.clone();
        prop_assert_eq!(copy.dump(), t.dump());
        prop_assert_eq!(copy.node_count(), t.node_count());
        prop_assert_eq!(copy.vacant_count(), t.vacant_count());
    }
}

/// Calls `f` once per ordering of `items` (Heap's algorithm, iterative).
fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    let mut order = items.to_vec();
    let mut swaps = vec![0usize; order.len()];
    f(order.clone());

    let mut level = 1;
    while level < order.len() {
        if swaps[level] < level {
            let other = if level % 2 == 0 { 0 } else { swaps[level] };
            order.swap(other, level);
            f(order.clone());
            swaps[level] += 1;
            level = 1;
        } else {
            swaps[level] = 0;
            level += 1;
        }
    }
}

#[test]
fn permutations_cover_every_ordering() {
    let mut seen = std::collections::BTreeSet::new();
    for_each_permutation(&[1, 2, 3, 4], |perm| {
        assert!(seen.insert(perm));
    });
    assert_eq!(seen.len(), 24);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let tags: Vec<Tag> = vec![10, 20, 30, 40, 50, 60];

    for_each_permutation(&tags, |perm| {
        let mut t = TagTree::new();
        for tag in perm {
            assert!(t.insert(Record::new("alice", tag, false, "b", "s")));
        }
        validate_tags(&t);
        let got: Vec<Tag> = t.iter().map(Record::tag).collect();
        assert_eq!(got, tags);
        assert!(t.height() <= 4, "height {} for 6 tags", t.height());
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let tags: Vec<Tag> = vec![10, 20, 30, 40, 50, 60, 70];

    // Insert in a fixed order, then remove in all permutations.
    let mut base = TagTree::new();
    for &tag in &[40, 20, 60, 10, 30, 50, 70] {
        assert!(base.insert(Record::new("alice", tag, false, "b", "s")));
    }

    for_each_permutation(&tags, |perm| {
        let mut t = base.clone();
        let mut remaining = tags.len();

        for tag in perm {
            assert!(t.remove(tag).is_some());
            remaining -= 1;
            assert_eq!(t.len(), remaining);
            validate_tags(&t);

            // Every freed tag goes straight back in and out again.
            assert!(t.insert(Record::new("alice", tag, true, "b", "s")));
            validate_tags(&t);
            assert!(t.remove(tag).is_some());
        }
        assert!(t.is_empty());
        assert_eq!(t.node_count(), 0);
    });
}

#[test]
fn exhaustive_name_order_small_set() {
    let names = ["a", "b", "c", "d", "e", "f"];

    for_each_permutation(&names, |perm| {
        let mut t = NameTree::new();
        for name in &perm {
            assert!(t.insert(Record::new(*name, 1, false, "b", "s")));
        }
        validate_index(&t);
        assert_eq!(t.height(), 2);

        for name in perm.iter().rev() {
            assert!(t.remove(name, 1).is_some());
            validate_index(&t);
        }
        assert!(t.is_empty());
    });
}
