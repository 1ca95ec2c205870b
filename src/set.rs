//! Shared contract implemented by every ordered-set strategy.
//!
//! ## Overview
//!
//! [`SortedSet`] is the observable surface of the crate: construct empty,
//! insert, membership test, length, and ascending traversal. Every strategy
//! ([`SortedVecSet`](crate::SortedVecSet), [`AlgebraicSet`](crate::AlgebraicSet),
//! [`BTreeSet`](crate::BTreeSet)) satisfies the identical contract and
//! differs only in internal representation.
//!
//! # Examples
//!
//! ```rust
//! use cowset::prelude::*;
//!
//! fn collect_sorted<S: SortedSet<Element = i32>>(values: &[i32]) -> Vec<i32> {
//!     let mut set = S::default();
//!     for &value in values {
//!         set.insert(value);
//!     }
//!     set.iter().copied().collect()
//! }
//!
//! assert_eq!(collect_sorted::<BTreeSet<i32>>(&[3, 1, 2, 1]), vec![1, 2, 3]);
//! assert_eq!(collect_sorted::<SortedVecSet<i32>>(&[3, 1, 2, 1]), vec![1, 2, 3]);
//! ```

use std::borrow::Borrow;

// =============================================================================
// Insertion
// =============================================================================

/// Outcome of a [`SortedSet::insert`] call.
///
/// A duplicate insertion is not an error: the set is left untouched and the
/// pre-existing member is reported back, distinguishable through
/// [`inserted`](Self::inserted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion<T> {
    /// Whether the element was newly stored.
    pub inserted: bool,
    /// The member in the set after the call: the pre-existing stored element
    /// when the insertion was a duplicate, the inserted element otherwise.
    pub member: T,
}

// =============================================================================
// SortedSet
// =============================================================================

/// A mutable container of unique, totally-ordered elements.
///
/// Ascending traversal visits every element exactly once in sorted order.
/// Inserting an element equal to an existing member is a defined no-op that
/// never overwrites the stored element.
pub trait SortedSet: Default {
    /// Element type stored by the set.
    type Element: Ord + Clone;

    /// Borrowing iterator over the elements in ascending order.
    type Iter<'a>: Iterator<Item = &'a Self::Element>
    where
        Self: 'a;

    /// Inserts `element` into the set.
    ///
    /// Returns [`Insertion`] carrying the member now in the set: the
    /// pre-existing element (unchanged, not overwritten) when an equal one
    /// was already present, the freshly stored `element` otherwise.
    fn insert(&mut self, element: Self::Element) -> Insertion<Self::Element>;

    /// Returns `true` when the set holds an element equal to `element`.
    fn contains<Q>(&self, element: &Q) -> bool
    where
        Self::Element: Borrow<Q>,
        Q: Ord + ?Sized;

    /// Returns the number of distinct elements in the set.
    fn len(&self) -> usize;

    /// Returns `true` when the set holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the elements in ascending order.
    fn iter(&self) -> Self::Iter<'_>;
}

// =============================================================================
// Tests
// =============================================================================
