//! Sorted-vector ordered set.
//!
//! This module provides [`SortedVecSet`], the simplest strategy for the
//! [`SortedSet`](crate::SortedSet) contract: a `Vec` kept in strictly
//! ascending order, searched by lower-bound binary search.
//!
//! # Overview
//!
//! The vector representation trades insertion cost for compactness and
//! cache-friendly reads. It is the baseline the tree strategies are
//! measured against.
//!
//! # Time Complexity
//!
//! | Operation  | Complexity          |
//! |------------|---------------------|
//! | `insert`   | O(n) (shift)        |
//! | `contains` | O(log n)            |
//! | `len`      | O(1)                |
//! | `iter`     | O(1) + O(n)         |
//!
//! # Examples
//!
//! ```rust
//! use cowset::prelude::*;
//!
//! let mut set = SortedVecSet::new();
//! set.insert(3);
//! set.insert(1);
//! set.insert(2);
//!
//! let ascending: Vec<&i32> = set.iter().collect();
//! assert_eq!(ascending, vec![&1, &2, &3]);
//! ```

use std::borrow::Borrow;
use std::fmt;

use crate::set::{Insertion, SortedSet};

// =============================================================================
// SortedVecSet Definition
// =============================================================================

/// An ordered set backed by a sorted `Vec`.
///
/// Elements are stored in strictly ascending order with no duplicates.
/// Membership tests are binary searches; insertion shifts the tail of the
/// vector to make room.
///
/// # Examples
///
/// ```rust
/// use cowset::prelude::*;
///
/// let mut set: SortedVecSet<i32> = [3, 1, 2, 1].into_iter().collect();
/// assert_eq!(set.len(), 3);
/// assert!(set.contains(&2));
///
/// let insertion = set.insert(2);
/// assert!(!insertion.inserted);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SortedVecSet<T> {
    /// Elements in strictly ascending order
    storage: Vec<T>,
}

impl<T> SortedVecSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let set: SortedVecSet<i32> = SortedVecSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: Vec::new(),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Returns the elements as a sorted slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let set: SortedVecSet<i32> = [2, 1].into_iter().collect();
    /// assert_eq!(set.as_slice(), &[1, 2]);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// Returns an iterator over the elements in ascending order.
    #[inline]
    pub fn iter(&self) -> SortedVecSetIterator<'_, T> {
        SortedVecSetIterator {
            inner: self.storage.iter(),
        }
    }
}

impl<T: Ord + Clone> SortedVecSet<T> {
    /// Returns `true` if the set contains an element equal to `element`.
    ///
    /// The element may be any borrowed form of the set's element type, but
    /// the ordering on the borrowed form must match the ordering on the
    /// element type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let mut set = SortedVecSet::new();
    /// set.insert("hello".to_string());
    ///
    /// // Can use &str to look up String elements
    /// assert!(set.contains("hello"));
    /// assert!(!set.contains("world"));
    /// ```
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.storage
            .binary_search_by(|item| item.borrow().cmp(element))
            .is_ok()
    }

    /// Inserts `element` into the set.
    ///
    /// If an equal element is already present, the set is unchanged and the
    /// stored element is reported back.
    ///
    /// # Complexity
    ///
    /// O(n) worst case (the tail of the vector shifts right)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let mut set = SortedVecSet::new();
    /// assert!(set.insert(1).inserted);
    /// assert!(!set.insert(1).inserted);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, element: T) -> Insertion<T> {
        match self.storage.binary_search(&element) {
            Ok(index) => Insertion {
                inserted: false,
                member: self.storage[index].clone(),
            },
            Err(index) => {
                let member = element.clone();
                self.storage.insert(index, element);
                Insertion {
                    inserted: true,
                    member,
                }
            }
        }
    }
}

// =============================================================================
// SortedSet Implementation
// =============================================================================

impl<T: Ord + Clone> SortedSet for SortedVecSet<T> {
    type Element = T;
    type Iter<'a>
        = SortedVecSetIterator<'a, T>
    where
        Self: 'a;

    #[inline]
    fn insert(&mut self, element: T) -> Insertion<T> {
        Self::insert(self, element)
    }

    #[inline]
    fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Self::contains(self, element)
    }

    #[inline]
    fn len(&self) -> usize {
        Self::len(self)
    }

    #[inline]
    fn iter(&self) -> SortedVecSetIterator<'_, T> {
        Self::iter(self)
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over references to the elements of a [`SortedVecSet`] in
/// ascending order.
pub struct SortedVecSetIterator<'a, T> {
    inner: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for SortedVecSetIterator<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for SortedVecSetIterator<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the elements of a [`SortedVecSet`] in ascending
/// order.
pub struct SortedVecSetIntoIterator<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Iterator for SortedVecSetIntoIterator<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for SortedVecSetIntoIterator<T> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for SortedVecSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> FromIterator<T> for SortedVecSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord + Clone> Extend<T> for SortedVecSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T> IntoIterator for SortedVecSet<T> {
    type Item = T;
    type IntoIter = SortedVecSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        SortedVecSetIntoIterator {
            inner: self.storage.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a SortedVecSet<T> {
    type Item = &'a T;
    type IntoIter = SortedVecSetIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for SortedVecSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for SortedVecSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================
