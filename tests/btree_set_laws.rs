//! Property-based tests for the copy-on-write B-tree set.
//!
//! The laws pin the set semantics against `std::collections::BTreeSet` as
//! the oracle and check the structural invariants through the validator,
//! across arbitrary element sequences and node orders.

use cowset::prelude::*;
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

/// Node orders from the degenerate minimum up past the default.
fn arbitrary_order() -> impl Strategy<Value = usize> {
    3_usize..33
}

/// Element sequences with plenty of duplicates.
fn arbitrary_values(max_length: usize) -> impl Strategy<Value = Vec<i16>> {
    prop::collection::vec(any::<i16>(), 0..max_length)
}

fn set_from(order: usize, values: &[i16]) -> BTreeSet<i16> {
    let mut set = BTreeSet::with_order(order);
    for &value in values {
        set.insert(value);
    }
    set
}

fn oracle_from(values: &[i16]) -> std::collections::BTreeSet<i16> {
    values.iter().copied().collect()
}

// =============================================================================
// Ordering and Membership Laws
// =============================================================================

proptest! {
    /// Law: iteration yields exactly the distinct elements, in ascending
    /// order, whatever the insertion order and node order.
    #[test]
    fn prop_iteration_matches_oracle(
        order in arbitrary_order(),
        values in arbitrary_values(300)
    ) {
        let set = set_from(order, &values);
        let oracle = oracle_from(&values);

        prop_assert_eq!(set.len(), oracle.len());
        prop_assert!(set.iter().eq(oracle.iter()));
    }

    /// Law: membership agrees with the oracle, for hits and misses alike.
    #[test]
    fn prop_contains_agrees_with_oracle(
        order in arbitrary_order(),
        values in arbitrary_values(200),
        probes in arbitrary_values(50)
    ) {
        let set = set_from(order, &values);
        let oracle = oracle_from(&values);

        for probe in probes {
            prop_assert_eq!(set.contains(&probe), oracle.contains(&probe));
        }
    }

    /// Law: first and last match the iteration boundaries.
    #[test]
    fn prop_first_last_match_iteration(
        order in arbitrary_order(),
        values in arbitrary_values(200)
    ) {
        let set = set_from(order, &values);

        prop_assert_eq!(set.first(), set.iter().next());
        prop_assert_eq!(set.last(), set.iter().last());
        prop_assert_eq!(set.first(), set.iter_descending().last());
        prop_assert_eq!(set.last(), set.iter_descending().next());
    }

    /// Law: sets are equal exactly when they hold the same elements,
    /// regardless of how they were built.
    #[test]
    fn prop_equality_is_element_equality(
        order in arbitrary_order(),
        values in arbitrary_values(100),
        shuffled in arbitrary_values(100).prop_shuffle()
    ) {
        let forward = set_from(order, &values);
        let rebuilt = set_from(order, &{
            let mut reversed = values.clone();
            reversed.reverse();
            reversed
        });

        prop_assert_eq!(&forward, &rebuilt);

        let other = set_from(order, &shuffled);
        prop_assert_eq!(
            forward == other,
            forward.iter().eq(other.iter())
        );
    }
}

// =============================================================================
// Structural Invariant Laws
// =============================================================================

proptest! {
    /// Law: every intermediate tree a build passes through is a valid
    /// B-tree; the validator never fires on API-built trees.
    #[test]
    fn prop_validator_accepts_every_build_state(
        order in arbitrary_order(),
        values in arbitrary_values(120)
    ) {
        let mut set = BTreeSet::with_order(order);
        for value in values {
            set.insert(value);
            set.validate();
        }
    }

    /// Law: duplicate insertion is a strict no-op: same length, same
    /// elements, `inserted == false`, stored member reported.
    #[test]
    fn prop_duplicate_insert_is_identity(
        order in arbitrary_order(),
        values in arbitrary_values(150)
    ) {
        prop_assume!(!values.is_empty());
        let mut set = set_from(order, &values);
        let snapshot: Vec<i16> = set.iter().copied().collect();

        let duplicate = values[values.len() / 2];
        let insertion = set.insert(duplicate);

        prop_assert!(!insertion.inserted);
        prop_assert_eq!(insertion.member, duplicate);
        let after: Vec<i16> = set.iter().copied().collect();
        prop_assert_eq!(snapshot, after);
        set.validate();
    }
}

// =============================================================================
// Copy-on-Write Laws
// =============================================================================

proptest! {
    /// Law: mutating a fork never changes the original handle's contents,
    /// and both handles stay structurally valid.
    #[test]
    fn prop_fork_independence(
        order in arbitrary_order(),
        values in arbitrary_values(150),
        extras in arbitrary_values(50)
    ) {
        let original = set_from(order, &values);
        let snapshot: Vec<i16> = original.iter().copied().collect();

        let mut fork = original.clone();
        for extra in extras {
            fork.insert(extra);
        }

        let unchanged: Vec<i16> = original.iter().copied().collect();
        prop_assert_eq!(snapshot, unchanged);
        original.validate();
        fork.validate();
    }

    /// Law: a fork plus extra inserts equals a set built from the
    /// concatenated sequence in one go.
    #[test]
    fn prop_fork_equals_fresh_build(
        order in arbitrary_order(),
        values in arbitrary_values(100),
        extras in arbitrary_values(50)
    ) {
        // keep the original alive so the fork's inserts run shared
        let original = set_from(order, &values);
        let mut fork = original.clone();
        for &extra in &extras {
            fork.insert(extra);
        }

        let mut combined = values.clone();
        combined.extend_from_slice(&extras);
        let fresh = set_from(order, &combined);

        prop_assert_eq!(fork, fresh);
        prop_assert_eq!(original.len(), oracle_from(&values).len());
    }
}

// =============================================================================
// Cursor Laws
// =============================================================================

proptest! {
    /// Law: a full cursor walk visits exactly the iterator's sequence,
    /// forward and backward.
    #[test]
    fn prop_cursor_walk_matches_iteration(
        order in arbitrary_order(),
        values in arbitrary_values(120)
    ) {
        let set = set_from(order, &values);
        let expected: Vec<i16> = set.iter().copied().collect();

        let mut cursor = set.start();
        let mut forward = Vec::with_capacity(expected.len());
        while cursor != set.end() {
            forward.push(*set.element(&cursor));
            set.advance(&mut cursor);
        }
        prop_assert_eq!(&forward, &expected);

        let mut backward = Vec::with_capacity(expected.len());
        while cursor != set.start() {
            set.retreat(&mut cursor);
            backward.push(*set.element(&cursor));
        }
        backward.reverse();
        prop_assert_eq!(&backward, &expected);
    }

    /// Law: cursor ordering agrees with element ordering at every pair of
    /// positions.
    #[test]
    fn prop_cursor_order_is_element_order(
        order in arbitrary_order(),
        values in arbitrary_values(60)
    ) {
        let set = set_from(order, &values);

        let mut left = set.start();
        while left != set.end() {
            let mut right = left.clone();
            prop_assert!(left == right);
            set.advance(&mut right);
            while right != set.end() {
                prop_assert!(left < right);
                prop_assert_eq!(
                    set.element(&left) < set.element(&right),
                    left < right
                );
                set.advance(&mut right);
            }
            prop_assert!(left < set.end());
            set.advance(&mut left);
        }
    }
}

// =============================================================================
// Cross-Strategy Laws
// =============================================================================

proptest! {
    /// Law: all three strategies compute the same set.
    #[test]
    fn prop_strategies_agree(values in arbitrary_values(150)) {
        let array: SortedVecSet<i16> = values.iter().copied().collect();
        let algebraic: AlgebraicSet<i16> = values.iter().copied().collect();
        let btree: BTreeSet<i16> = values.iter().copied().collect();
        let oracle = oracle_from(&values);

        prop_assert!(array.iter().eq(oracle.iter()));
        prop_assert!(algebraic.iter().eq(oracle.iter()));
        prop_assert!(btree.iter().eq(oracle.iter()));
    }
}
