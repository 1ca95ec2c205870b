//! Persistent (immutable) ordered set based on a red-black tree.
//!
//! This module provides [`AlgebraicSet`], a purely functional ordered set:
//! insertion never mutates existing nodes, it builds a fresh root-to-leaf
//! path and shares every untouched subtree with the previous version.
//!
//! # Overview
//!
//! - O(log n) `contains` / `get`
//! - O(log n) `inserting` (allocates one path, shares the rest)
//! - O(1) `len`, `is_empty`, and handle clone
//!
//! # Internal Structure
//!
//! The red-black tree maintains the following invariants:
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. Red nodes have only black children
//! 4. Every path from the root to a missing child has the same number of
//!    black nodes
//!
//! These invariants bound the tree height by O(log n). Rebalancing is the
//! four-case red-red reshape applied on the way back up from an insertion;
//! each case lifts the middle element of the offending red-red pair into a
//! red parent over two black children.
//!
//! # Examples
//!
//! ```rust
//! use cowset::prelude::*;
//!
//! let set = AlgebraicSet::new().inserting(3).inserting(1).inserting(2);
//!
//! // Structural sharing: the original set is preserved
//! let extended = set.inserting(4);
//! assert_eq!(set.len(), 3);      // Original unchanged
//! assert_eq!(extended.len(), 4); // New version
//!
//! let ascending: Vec<&i32> = set.iter().collect();
//! assert_eq!(ascending, vec![&1, &2, &3]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::ReferenceCounter;
use crate::set::{Insertion, SortedSet};

// =============================================================================
// Color Definition
// =============================================================================

/// The color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the red-black tree.
#[derive(Clone)]
struct Node<T> {
    element: T,
    color: Color,
    left: Option<ReferenceCounter<Self>>,
    right: Option<ReferenceCounter<Self>>,
}

impl<T> Node<T> {
    /// Creates a new red node with no children.
    const fn new_red(element: T) -> Self {
        Self {
            element,
            color: Color::Red,
            left: None,
            right: None,
        }
    }

    /// Creates a copy of this node with a new color.
    fn with_color(&self, color: Color) -> Self
    where
        T: Clone,
    {
        Self {
            element: self.element.clone(),
            color,
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }

    /// Checks if this node is red.
    fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

// =============================================================================
// AlgebraicSet Definition
// =============================================================================

/// A persistent (immutable) ordered set based on a red-black tree.
///
/// Mutating through [`SortedSet::insert`] replaces the handle's root with a
/// freshly built path; [`inserting`](Self::inserting) exposes the same
/// operation functionally, returning the new version and leaving `self`
/// untouched. Either way, unchanged subtrees are shared between versions.
///
/// # Time Complexity
///
/// | Operation   | Complexity |
/// |-------------|------------|
/// | `new`       | O(1)       |
/// | `contains`  | O(log n)   |
/// | `get`       | O(log n)   |
/// | `inserting` | O(log n)   |
/// | `first`     | O(log n)   |
/// | `last`      | O(log n)   |
/// | `len`       | O(1)       |
///
/// # Examples
///
/// ```rust
/// use cowset::prelude::*;
///
/// let set = AlgebraicSet::singleton(42);
/// assert!(set.contains(&42));
///
/// let more = set.inserting(7).inserting(99);
/// assert_eq!(more.len(), 3);
/// assert_eq!(set.len(), 1); // Original unchanged
/// ```
#[derive(Clone)]
pub struct AlgebraicSet<T> {
    /// Root node of the tree
    root: Option<ReferenceCounter<Node<T>>>,
    /// Number of elements
    length: usize,
}

impl<T> AlgebraicSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let set: AlgebraicSet<i32> = AlgebraicSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the smallest element of the set, or `None` when empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        while let Some(left) = node.left.as_ref() {
            node = left;
        }
        Some(&node.element)
    }

    /// Returns the largest element of the set, or `None` when empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        while let Some(right) = node.right.as_ref() {
            node = right;
        }
        Some(&node.element)
    }

    /// Returns an iterator over the elements in ascending order.
    #[must_use]
    pub fn iter(&self) -> AlgebraicSetIterator<'_, T> {
        let mut elements = Vec::with_capacity(self.length);
        Self::push_ascending(self.root.as_ref(), &mut elements);
        AlgebraicSetIterator {
            elements,
            current_index: 0,
        }
    }

    /// Collects element references in ascending order.
    fn push_ascending<'a>(node: Option<&'a ReferenceCounter<Node<T>>>, out: &mut Vec<&'a T>) {
        if let Some(node_ref) = node {
            Self::push_ascending(node_ref.left.as_ref(), out);
            out.push(&node_ref.element);
            Self::push_ascending(node_ref.right.as_ref(), out);
        }
    }
}

impl<T: Clone + Ord> AlgebraicSet<T> {
    /// Creates a set containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let set = AlgebraicSet::singleton(42);
    /// assert_eq!(set.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().inserting(element)
    }

    /// Returns a reference to the stored element equal to `element`.
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
    /// let set = AlgebraicSet::singleton("hello".to_string());
    /// assert_eq!(set.get("hello"), Some(&"hello".to_string()));
    /// assert_eq!(set.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_ref();
        while let Some(node_ref) = node {
            match element.cmp(node_ref.element.borrow()) {
                Ordering::Less => node = node_ref.left.as_ref(),
                Ordering::Greater => node = node_ref.right.as_ref(),
                Ordering::Equal => return Some(&node_ref.element),
            }
        }
        None
    }

    /// Returns `true` if the set contains an element equal to `element`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[inline]
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(element).is_some()
    }

    /// Returns a new set with `element` inserted; `self` is unchanged.
    ///
    /// Inserting an element equal to an existing member returns a set
    /// sharing the original root: nothing is rebuilt and the stored member
    /// is not overwritten.
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
    /// let set = AlgebraicSet::new().inserting(1);
    /// let extended = set.inserting(2);
    ///
    /// assert_eq!(set.len(), 1);      // Original unchanged
    /// assert_eq!(extended.len(), 2); // New version
    /// ```
    #[must_use]
    pub fn inserting(&self, element: T) -> Self {
        self.insert_outcome(element).0
    }

    /// Inserts and reports the outcome alongside the new version.
    fn insert_outcome(&self, element: T) -> (Self, Insertion<T>) {
        let member = element.clone();
        let (new_root, existing) = Self::insert_into_node(self.root.as_ref(), element);

        if let Some(stored) = existing {
            // Duplicate: the returned root is the original, shared
            return (
                Self {
                    root: Some(new_root),
                    length: self.length,
                },
                Insertion {
                    inserted: false,
                    member: stored,
                },
            );
        }

        // Make root black
        let black_root = if new_root.is_red() {
            ReferenceCounter::new(new_root.with_color(Color::Black))
        } else {
            new_root
        };

        (
            Self {
                root: Some(black_root),
                length: self.length + 1,
            },
            Insertion {
                inserted: true,
                member,
            },
        )
    }

    /// Recursive helper for insertion.
    ///
    /// Returns (`new_node`, `existing`) where `existing` carries the stored
    /// member when `element` was already present. On the duplicate path every
    /// level returns its original node untouched, so the whole insertion
    /// allocates nothing.
    fn insert_into_node(
        node: Option<&ReferenceCounter<Node<T>>>,
        element: T,
    ) -> (ReferenceCounter<Node<T>>, Option<T>) {
        match node {
            None => (ReferenceCounter::new(Node::new_red(element)), None),
            Some(node_ref) => match element.cmp(&node_ref.element) {
                Ordering::Less => {
                    let (new_left, existing) =
                        Self::insert_into_node(node_ref.left.as_ref(), element);
                    if existing.is_some() {
                        return (ReferenceCounter::clone(node_ref), existing);
                    }
                    let new_node = Node {
                        element: node_ref.element.clone(),
                        color: node_ref.color,
                        left: Some(new_left),
                        right: node_ref.right.clone(),
                    };
                    (ReferenceCounter::new(Self::balance(new_node)), None)
                }
                Ordering::Greater => {
                    let (new_right, existing) =
                        Self::insert_into_node(node_ref.right.as_ref(), element);
                    if existing.is_some() {
                        return (ReferenceCounter::clone(node_ref), existing);
                    }
                    let new_node = Node {
                        element: node_ref.element.clone(),
                        color: node_ref.color,
                        left: node_ref.left.clone(),
                        right: Some(new_right),
                    };
                    (ReferenceCounter::new(Self::balance(new_node)), None)
                }
                Ordering::Equal => (
                    ReferenceCounter::clone(node_ref),
                    Some(node_ref.element.clone()),
                ),
            },
        }
    }

    /// Reshapes a red-red violation directly under a black node.
    ///
    /// All four cases lift the middle element of the offending pair into a
    /// red parent over two black children, preserving the black count of
    /// every path through the subtree.
    fn balance(node: Node<T>) -> Node<T> {
        if node.is_red() {
            return node;
        }

        // Left-Left
        if let Some(left) = &node.left
            && left.is_red()
            && let Some(left_left) = &left.left
            && left_left.is_red()
        {
            return Node {
                element: left.element.clone(),
                color: Color::Red,
                left: Some(ReferenceCounter::new(left_left.with_color(Color::Black))),
                right: Some(ReferenceCounter::new(Node {
                    element: node.element.clone(),
                    color: Color::Black,
                    left: left.right.clone(),
                    right: node.right.clone(),
                })),
            };
        }

        // Left-Right
        if let Some(left) = &node.left
            && left.is_red()
            && let Some(left_right) = &left.right
            && left_right.is_red()
        {
            return Node {
                element: left_right.element.clone(),
                color: Color::Red,
                left: Some(ReferenceCounter::new(Node {
                    element: left.element.clone(),
                    color: Color::Black,
                    left: left.left.clone(),
                    right: left_right.left.clone(),
                })),
                right: Some(ReferenceCounter::new(Node {
                    element: node.element.clone(),
                    color: Color::Black,
                    left: left_right.right.clone(),
                    right: node.right.clone(),
                })),
            };
        }

        // Right-Left
        if let Some(right) = &node.right
            && right.is_red()
            && let Some(right_left) = &right.left
            && right_left.is_red()
        {
            return Node {
                element: right_left.element.clone(),
                color: Color::Red,
                left: Some(ReferenceCounter::new(Node {
                    element: node.element.clone(),
                    color: Color::Black,
                    left: node.left.clone(),
                    right: right_left.left.clone(),
                })),
                right: Some(ReferenceCounter::new(Node {
                    element: right.element.clone(),
                    color: Color::Black,
                    left: right_left.right.clone(),
                    right: right.right.clone(),
                })),
            };
        }

        // Right-Right
        if let Some(right) = &node.right
            && right.is_red()
            && let Some(right_right) = &right.right
            && right_right.is_red()
        {
            return Node {
                element: right.element.clone(),
                color: Color::Red,
                left: Some(ReferenceCounter::new(Node {
                    element: node.element.clone(),
                    color: Color::Black,
                    left: node.left.clone(),
                    right: right.left.clone(),
                })),
                right: Some(ReferenceCounter::new(right_right.with_color(Color::Black))),
            };
        }

        node
    }
}

// =============================================================================
// SortedSet Implementation
// =============================================================================

impl<T: Ord + Clone> SortedSet for AlgebraicSet<T> {
    type Element = T;
    type Iter<'a>
        = AlgebraicSetIterator<'a, T>
    where
        Self: 'a;

    fn insert(&mut self, element: T) -> Insertion<T> {
        let (new_set, insertion) = self.insert_outcome(element);
        *self = new_set;
        insertion
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
    fn iter(&self) -> AlgebraicSetIterator<'_, T> {
        Self::iter(self)
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over references to the elements of an [`AlgebraicSet`] in
/// ascending order.
pub struct AlgebraicSetIterator<'a, T> {
    elements: Vec<&'a T>,
    current_index: usize,
}

impl<'a, T> Iterator for AlgebraicSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.elements.len() {
            None
        } else {
            let element = self.elements[self.current_index];
            self.current_index += 1;
            Some(element)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.elements.len().saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for AlgebraicSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.elements.len().saturating_sub(self.current_index)
    }
}

/// An owning iterator over the elements of an [`AlgebraicSet`] in ascending
/// order.
pub struct AlgebraicSetIntoIterator<T> {
    elements: Vec<T>,
    current_index: usize,
}

impl<T: Clone> Iterator for AlgebraicSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.elements.len() {
            None
        } else {
            let element = self.elements[self.current_index].clone();
            self.current_index += 1;
            Some(element)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.elements.len().saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for AlgebraicSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.elements.len().saturating_sub(self.current_index)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for AlgebraicSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Ord> FromIterator<T> for AlgebraicSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for element in iter {
            set = set.inserting(element);
        }
        set
    }
}

impl<T: Clone + Ord> Extend<T> for AlgebraicSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            SortedSet::insert(self, element);
        }
    }
}

impl<T: Clone + Ord> IntoIterator for AlgebraicSet<T> {
    type Item = T;
    type IntoIter = AlgebraicSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let elements: Vec<T> = self.iter().cloned().collect();
        AlgebraicSetIntoIterator {
            elements,
            current_index: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a AlgebraicSet<T> {
    type Item = &'a T;
    type IntoIter = AlgebraicSetIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Ord> PartialEq for AlgebraicSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Clone + Ord> Eq for AlgebraicSet<T> {}

/// Computes a hash value for this set.
///
/// The hash covers the length and then every element in ascending order, so
/// insertion order never affects the hash and equal sets produce equal hash
/// values (Hash-Eq consistency).
impl<T: Clone + Ord + Hash> Hash for AlgebraicSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AlgebraicSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for AlgebraicSet<T> {
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
