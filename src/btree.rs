//! Copy-on-write B-tree ordered set.
//!
//! This module provides [`BTreeSet`], the core strategy of the crate: a
//! B-tree whose handles share nodes until one of them mutates.
//!
//! # Overview
//!
//! Cloning a handle is O(1) and shares the whole node graph. Insertion picks
//! one of two modes per node, probing exclusivity with the reference
//! counter's sole-owner query:
//!
//! - **In-place**: a node owned by no one else is edited directly, splitting
//!   on overflow.
//! - **Path-copy**: a node shared with another handle (or pinned by a live
//!   cursor) is never touched. A replacement node is built with the new
//!   element merged in, and when the merge overflows, the split and the
//!   merge happen in a single pass around the new median.
//!
//! Once a descent switches to path-copy it stays there: a sole-owner probe
//! deeper in a shared subtree is meaningless, because the subtree remains
//! reachable through the shared ancestor.
//!
//! Positions are [`Cursor`]s: bidirectional, ordered, and stamped with the
//! root's mutation counter. Borrowed iterators lock the set against mutation
//! at compile time; cursors instead detect structural change at run time and
//! report stale use by panicking.
//!
//! # Time Complexity
//!
//! | Operation           | Complexity               |
//! |---------------------|--------------------------|
//! | `insert`            | O(log n)                 |
//! | `contains` / `get`  | O(log n)                 |
//! | `first` / `last`    | O(log n)                 |
//! | `start` / `end`     | O(log n)                 |
//! | `advance`/`retreat` | amortized O(1)           |
//! | `len` / `is_empty`  | O(1)                     |
//! | handle `clone`      | O(1)                     |
//!
//! # Internal Structure
//!
//! Every node holds up to `order - 1` elements in strictly ascending order;
//! an internal node holds exactly one more child than elements, and the
//! elements separate the child ranges. All leaves sit at the same depth;
//! the only rebalancing primitive is the median split, so the tree grows in
//! height exclusively at the root. Non-root nodes stay at least half full.
//!
//! # Examples
//!
//! ```rust
//! use cowset::prelude::*;
//!
//! let mut set = BTreeSet::with_order(4);
//! for value in [9, 6, 12, 2, 10, 3, 1, 13, 8, 5, 11, 7, 4] {
//!     set.insert(value);
//! }
//!
//! assert!(set.contains(&8));
//! assert!(!set.contains(&14));
//! assert_eq!(set.len(), 13);
//!
//! let ascending: Vec<i32> = set.iter().copied().collect();
//! assert_eq!(ascending, (1..=13).collect::<Vec<i32>>());
//! ```

use smallvec::SmallVec;
use static_assertions::const_assert;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use crate::ReferenceCounter;
use crate::set::{Insertion, SortedSet};

// =============================================================================
// Order Configuration
// =============================================================================

/// Default maximum number of children per node.
///
/// Fan-out is an external input, not part of the algorithm; callers with a
/// known element size and cache budget pass their own value to
/// [`BTreeSet::with_order`].
pub const DEFAULT_ORDER: usize = 16;

// Order 3 is the smallest fan-out with a non-empty minimum occupancy.
const_assert!(DEFAULT_ORDER >= 3);

/// Inline capacity for root-to-leaf frame stacks.
const PATH_CAPACITY: usize = 8;

// =============================================================================
// Node Definition
// =============================================================================

/// Array-backed tree node: sorted elements plus, for internal nodes, one
/// child more than elements.
#[derive(Debug)]
struct Node<T> {
    /// Maximum number of children this node may hold
    order: usize,
    /// Stamp of structural edits to this node's subtree
    mutation_count: u64,
    /// Elements in strictly ascending order, at most `order - 1` at rest
    elements: Vec<T>,
    /// Empty for leaves, `elements.len() + 1` entries otherwise
    children: Vec<ReferenceCounter<Node<T>>>,
}

/// Separator element and sibling node promoted out of an overflowing node,
/// carried one level up the insertion path.
struct Splinter<T> {
    separator: T,
    node: ReferenceCounter<Node<T>>,
}

impl<T> Node<T> {
    fn new(order: usize) -> Self {
        Self {
            order,
            mutation_count: 0,
            // one slot of headroom: a node may hold order elements
            // momentarily, between an insertion and the split it triggers
            elements: Vec::with_capacity(order),
            children: Vec::new(),
        }
    }

    const fn max_elements(&self) -> usize {
        self.order - 1
    }

    const fn min_elements(&self) -> usize {
        (self.order + 1) / 2 - 1
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn is_too_large(&self) -> bool {
        self.elements.len() > self.max_elements()
    }

    /// Locates `element` in this node: `Ok` with the matching slot, or `Err`
    /// with the insertion slot keeping the elements ascending.
    fn slot<Q>(&self, element: &Q) -> Result<usize, usize>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.elements
            .binary_search_by(|item| item.borrow().cmp(element))
    }

    /// Total number of elements in this subtree. Used by the validator to
    /// cross-check the handle's cached length, never on the insertion path.
    fn subtree_count(&self) -> usize {
        self.children
            .iter()
            .fold(self.elements.len(), |count, child| {
                count + child.subtree_count()
            })
    }
}

impl<T: Clone> Node<T> {
    /// A new node with a fresh copy of the element buffer and a shallow copy
    /// of the child references; the children stay shared until they are
    /// themselves replaced. The copy starts a fresh mutation history.
    fn clone_node(&self) -> Self {
        let mut node = Self::new(self.order);
        node.elements.extend_from_slice(&self.elements);
        if !self.is_leaf() {
            node.children.reserve(self.order + 1);
            node.children.extend_from_slice(&self.children);
        }
        node
    }

    /// Detaches everything above the median into a fresh sibling and
    /// promotes the median itself. The only rebalancing primitive.
    fn split(&mut self) -> Splinter<T> {
        let middle = self.elements.len() / 2;

        let mut sibling = Self::new(self.order);
        sibling.elements.extend(self.elements.drain(middle + 1..));
        let separator = match self.elements.pop() {
            Some(element) => element,
            None => unreachable!("split invoked on an empty node"),
        };

        if !self.is_leaf() {
            sibling.children.reserve(self.order + 1);
            sibling.children.extend(self.children.drain(middle + 1..));
        }

        Splinter {
            separator,
            node: ReferenceCounter::new(sibling),
        }
    }

    /// Inserts a splinter handed up by the child at `index`, splitting again
    /// when this node overflows in turn.
    fn absorb(&mut self, splinter: Option<Splinter<T>>, index: usize) -> Option<Splinter<T>> {
        let splinter = splinter?;
        self.elements.insert(index, splinter.separator);
        self.children.insert(index + 1, splinter.node);
        if self.is_too_large() {
            Some(self.split())
        } else {
            None
        }
    }
}

// =============================================================================
// Insertion Engine
// =============================================================================

impl<T: Ord + Clone> Node<T> {
    /// In-place insertion into an exclusively owned subtree.
    ///
    /// Returns the stored member when `element` was already present (and
    /// edits nothing), otherwise `None` plus the splinter of a split this
    /// node could not absorb. Every node on a successful path bumps its
    /// mutation counter exactly once.
    fn insert_in_place(&mut self, element: T) -> (Option<T>, Option<Splinter<T>>) {
        let index = match self.slot(&element) {
            Ok(index) => return (Some(self.elements[index].clone()), None),
            Err(index) => index,
        };

        if self.is_leaf() {
            self.mutation_count += 1;
            self.elements.insert(index, element);
            let splinter = if self.is_too_large() {
                Some(self.split())
            } else {
                None
            };
            return (None, splinter);
        }

        if let Some(child) = ReferenceCounter::get_mut(&mut self.children[index]) {
            let (existing, splinter) = child.insert_in_place(element);
            if existing.is_some() {
                return (existing, None);
            }
            self.mutation_count += 1;
            return (None, self.absorb(splinter, index));
        }

        // Shared child: its whole subtree is handled in path-copy mode.
        let (existing, trunk, splinter) = Self::inserting(&self.children[index], element);
        if existing.is_some() {
            return (existing, None);
        }
        self.children[index] = trunk;
        self.mutation_count += 1;
        (None, self.absorb(splinter, index))
    }

    /// Path-copy insertion: `this` and its descendants are never mutated.
    ///
    /// Returns the stored member on a duplicate (with `this` itself as the
    /// trunk), otherwise a freshly built trunk replacing `this`, plus the
    /// splinter of a split the trunk could not absorb.
    fn inserting(
        this: &ReferenceCounter<Self>,
        element: T,
    ) -> (Option<T>, ReferenceCounter<Self>, Option<Splinter<T>>) {
        let index = match this.slot(&element) {
            Ok(index) => {
                return (
                    Some(this.elements[index].clone()),
                    ReferenceCounter::clone(this),
                    None,
                );
            }
            Err(index) => index,
        };

        if this.is_leaf() {
            let (trunk, splinter) = this.merged(element, None, index);
            return (None, trunk, splinter);
        }

        let (existing, trunk, splinter) = Self::inserting(&this.children[index], element);
        if existing.is_some() {
            return (existing, ReferenceCounter::clone(this), None);
        }
        if let Some(splinter) = splinter {
            let (trunk, splinter) =
                this.merged(splinter.separator, Some((trunk, splinter.node)), index);
            return (None, trunk, splinter);
        }

        let mut node = this.clone_node();
        node.children[index] = trunk;
        (None, ReferenceCounter::new(node), None)
    }

    /// Builds the replacement node(s) for a path-copy step: `element` merged
    /// at `slot`, with the child there replaced by `neighbors` when a deeper
    /// split handed a pair up.
    ///
    /// On overflow the split happens in the same pass: the insertion slot is
    /// classified against the post-insertion median and both halves are
    /// built directly from that classification, so no over-full intermediate
    /// buffer ever exists.
    fn merged(
        &self,
        element: T,
        neighbors: Option<(ReferenceCounter<Self>, ReferenceCounter<Self>)>,
        slot: usize,
    ) -> (ReferenceCounter<Self>, Option<Splinter<T>>) {
        let count = self.elements.len();

        if count < self.max_elements() {
            let mut trunk = Self::new(self.order);
            trunk.elements.extend_from_slice(&self.elements[..slot]);
            trunk.elements.push(element);
            trunk.elements.extend_from_slice(&self.elements[slot..]);
            if let Some((first, second)) = neighbors {
                trunk.children = self.children.clone();
                trunk.children[slot] = first;
                trunk.children.insert(slot + 1, second);
            }
            return (ReferenceCounter::new(trunk), None);
        }

        let middle = (count + 1) / 2;
        let mut left = Self::new(self.order);
        let mut right = Self::new(self.order);
        let separator: T;

        match middle.cmp(&slot) {
            Ordering::Less => {
                // the new element lands in the right half
                separator = self.elements[middle].clone();

                left.elements.extend_from_slice(&self.elements[..middle]);
                right
                    .elements
                    .extend_from_slice(&self.elements[middle + 1..slot]);
                right.elements.push(element);
                right.elements.extend_from_slice(&self.elements[slot..]);

                if let Some((first, second)) = neighbors {
                    left.children.extend_from_slice(&self.children[..=middle]);
                    right
                        .children
                        .extend_from_slice(&self.children[middle + 1..slot]);
                    right.children.push(first);
                    right.children.push(second);
                    right.children.extend_from_slice(&self.children[slot + 1..]);
                }
            }
            Ordering::Greater => {
                // the new element lands in the left half
                separator = self.elements[middle - 1].clone();

                left.elements.extend_from_slice(&self.elements[..slot]);
                left.elements.push(element);
                left.elements
                    .extend_from_slice(&self.elements[slot..middle - 1]);
                right.elements.extend_from_slice(&self.elements[middle..]);

                if let Some((first, second)) = neighbors {
                    left.children.extend_from_slice(&self.children[..slot]);
                    left.children.push(first);
                    left.children.push(second);
                    left.children
                        .extend_from_slice(&self.children[slot + 1..middle]);
                    right.children.extend_from_slice(&self.children[middle..]);
                }
            }
            Ordering::Equal => {
                // the new element is the median itself
                separator = element;

                left.elements.extend_from_slice(&self.elements[..middle]);
                right.elements.extend_from_slice(&self.elements[middle..]);

                if let Some((first, second)) = neighbors {
                    left.children.extend_from_slice(&self.children[..middle]);
                    left.children.push(first);
                    right.children.push(second);
                    right
                        .children
                        .extend_from_slice(&self.children[middle + 1..]);
                }
            }
        }

        let splinter = Splinter {
            separator,
            node: ReferenceCounter::new(right),
        };
        (ReferenceCounter::new(left), Some(splinter))
    }

    /// A new root over a split old root: one separator, two children. The
    /// root inherits the configured order.
    fn grown_root(trunk: ReferenceCounter<Self>, splinter: Splinter<T>) -> Self {
        let mut root = Self::new(trunk.order);
        root.elements.push(splinter.separator);
        root.children.reserve(root.order + 1);
        root.children.push(trunk);
        root.children.push(splinter.node);
        root
    }
}

// =============================================================================
// BTreeSet Definition
// =============================================================================

/// An ordered set backed by a copy-on-write B-tree.
///
/// Handles own a single root reference; [`clone`](Clone::clone) is O(1) and
/// the clones share every node until one of them mutates. A mutation edits
/// exclusively owned nodes in place and rebuilds the path through shared
/// ones, so the observable contents of every other handle never change.
///
/// # Examples
///
/// ```rust
/// use cowset::prelude::*;
///
/// let mut first: BTreeSet<i32> = (0..5).collect();
/// let mut second = first.clone();
/// second.insert(5);
///
/// assert_eq!(first.len(), 5);  // Original unchanged
/// assert_eq!(second.len(), 6); // New version
/// ```
pub struct BTreeSet<T> {
    /// Root node; the empty set is a root leaf with no elements
    root: ReferenceCounter<Node<T>>,
    /// Number of elements, maintained by `insert`
    length: usize,
}

impl<T> BTreeSet<T> {
    /// Creates a new empty set with [`DEFAULT_ORDER`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let set: BTreeSet<i32> = BTreeSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    /// Creates a new empty set whose nodes hold up to `order` children.
    ///
    /// # Panics
    ///
    /// Panics if `order < 3`: smaller fan-outs cannot satisfy the minimum
    /// occupancy of a split node.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let set: BTreeSet<i32> = BTreeSet::with_order(64);
    /// assert_eq!(set.order(), 64);
    /// ```
    #[must_use]
    pub fn with_order(order: usize) -> Self {
        assert!(order >= 3, "order must be at least 3");
        Self {
            root: ReferenceCounter::new(Node::new(order)),
            length: 0,
        }
    }

    /// Returns the maximum number of children a node of this set may hold.
    #[inline]
    #[must_use]
    pub fn order(&self) -> usize {
        self.root.order
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
        let mut node = &self.root;
        while !node.is_leaf() {
            node = &node.children[0];
        }
        node.elements.first()
    }

    /// Returns the largest element of the set, or `None` when empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        let mut node = &self.root;
        while !node.is_leaf() {
            node = &node.children[node.elements.len()];
        }
        node.elements.last()
    }

    /// Returns an iterator over the elements in ascending order.
    ///
    /// The iterator borrows the set, so the borrow checker rules out
    /// mutation for as long as it lives; contrast with [`Cursor`]s, which
    /// permit interleaved mutation and detect it at run time instead.
    #[must_use]
    pub fn iter(&self) -> BTreeSetIterator<'_, T> {
        let mut iterator = BTreeSetIterator {
            stack: SmallVec::new(),
            remaining: self.length,
        };
        iterator.descend_first(&self.root);
        iterator
    }

    /// Returns an iterator over the elements in descending order.
    #[must_use]
    pub fn iter_descending(&self) -> BTreeSetDescendingIterator<'_, T> {
        let mut iterator = BTreeSetDescendingIterator {
            stack: SmallVec::new(),
            remaining: self.length,
        };
        iterator.descend_last(&self.root);
        iterator
    }
}

impl<T: Ord + Clone> BTreeSet<T> {
    /// Inserts `element` into the set.
    ///
    /// If an equal element is already present the set is left untouched (no
    /// node is edited or replaced, and live cursors stay valid) and the
    /// stored member is reported back.
    ///
    /// The root is probed for exclusivity like any other node: a root shared
    /// with another handle or pinned by a cursor is replaced rather than
    /// edited, which is what invalidates the cursors drawn from it.
    ///
    /// # Complexity
    ///
    /// O(log n), plus the cost of copying the path when nodes are shared
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let mut set = BTreeSet::new();
    /// assert!(set.insert(7).inserted);
    ///
    /// let duplicate = set.insert(7);
    /// assert!(!duplicate.inserted);
    /// assert_eq!(duplicate.member, 7);
    /// ```
    pub fn insert(&mut self, element: T) -> Insertion<T> {
        let member = element.clone();

        if let Some(root) = ReferenceCounter::get_mut(&mut self.root) {
            let (existing, splinter) = root.insert_in_place(element);
            return self.finish_insert(existing, splinter, member);
        }

        let (existing, trunk, splinter) = Node::inserting(&self.root, element);
        if existing.is_none() {
            self.root = trunk;
        }
        self.finish_insert(existing, splinter, member)
    }

    /// Applies root growth and the length update shared by both insertion
    /// modes.
    fn finish_insert(
        &mut self,
        existing: Option<T>,
        splinter: Option<Splinter<T>>,
        member: T,
    ) -> Insertion<T> {
        if let Some(stored) = existing {
            return Insertion {
                inserted: false,
                member: stored,
            };
        }
        if let Some(splinter) = splinter {
            let trunk = ReferenceCounter::clone(&self.root);
            self.root = ReferenceCounter::new(Node::grown_root(trunk, splinter));
        }
        self.length += 1;
        Insertion {
            inserted: true,
            member,
        }
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
    #[must_use]
    pub fn get<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = &self.root;
        loop {
            match node.slot(element) {
                Ok(index) => return Some(&node.elements[index]),
                Err(index) => {
                    if node.is_leaf() {
                        return None;
                    }
                    node = &node.children[index];
                }
            }
        }
    }

    /// Returns `true` if the set contains an element equal to `element`.
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
    /// let set: BTreeSet<String> = ["hello".to_string()].into_iter().collect();
    /// assert!(set.contains("hello"));
    /// assert!(!set.contains("world"));
    /// ```
    #[inline]
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(element).is_some()
    }

    /// Checks every structural invariant of the tree, panicking on the
    /// first violation.
    ///
    /// For every node: occupancy within bounds (the root is exempt from the
    /// minimum), elements strictly ascending within the interval inherited
    /// from the parent slot, child count equal to element count plus one,
    /// and equal depth across all children. Also cross-checks the cached
    /// length against a full recount. Intended for tests and diagnostics,
    /// never for the mutation path.
    pub fn validate(&self) {
        Self::validate_node(&self.root, 0, None, None);
        assert_eq!(
            self.length,
            self.root.subtree_count(),
            "cached length disagrees with the tree"
        );
    }

    /// Recursive invariant walk returning the subtree depth.
    fn validate_node(node: &Node<T>, level: usize, min: Option<&T>, max: Option<&T>) -> usize {
        assert!(!node.is_too_large(), "node holds more elements than its order allows");
        assert!(
            level == 0 || node.elements.len() >= node.min_elements(),
            "non-root node is under-full"
        );

        if node.elements.is_empty() {
            assert!(node.children.is_empty(), "empty node must be a leaf");
            return 0;
        }

        let mut previous = min;
        for element in &node.elements {
            assert!(
                previous.is_none_or(|bound| bound < element),
                "elements out of order"
            );
            previous = Some(element);
        }
        if let Some(bound) = max
            && let Some(last) = node.elements.last()
        {
            assert!(last < bound, "element exceeds the parent separator");
        }

        if node.is_leaf() {
            return 0;
        }

        assert_eq!(
            node.children.len(),
            node.elements.len() + 1,
            "internal node must hold one more child than elements"
        );

        let count = node.elements.len();
        let depth = Self::validate_node(&node.children[0], level + 1, min, Some(&node.elements[0]));
        for index in 1..count {
            let child_depth = Self::validate_node(
                &node.children[index],
                level + 1,
                Some(&node.elements[index - 1]),
                Some(&node.elements[index]),
            );
            assert_eq!(depth, child_depth, "leaf depth differs between siblings");
        }
        let child_depth = Self::validate_node(
            &node.children[count],
            level + 1,
            Some(&node.elements[count - 1]),
            max,
        );
        assert_eq!(depth, child_depth, "leaf depth differs between siblings");

        depth + 1
    }
}

impl<T: fmt::Debug> BTreeSet<T> {
    /// Renders the tree shape as a multi-line box diagram for debugging.
    ///
    /// One line per node, children indented under their parent. The format
    /// is for human eyes only and carries no stability guarantee.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cowset::prelude::*;
    ///
    /// let mut set = BTreeSet::with_order(3);
    /// for value in [1, 2, 3] {
    ///     set.insert(value);
    /// }
    /// assert_eq!(set.diagram(), "[2]\n├── [1]\n└── [3]\n");
    /// ```
    #[must_use]
    pub fn diagram(&self) -> String {
        let mut out = format!("{:?}\n", self.root.elements);
        Self::write_children(&self.root, "", &mut out);
        out
    }

    fn write_children(node: &Node<T>, prefix: &str, out: &mut String) {
        let Some(last) = node.children.len().checked_sub(1) else {
            return;
        };
        for (index, child) in node.children.iter().enumerate() {
            out.push_str(prefix);
            out.push_str(if index == last { "└── " } else { "├── " });
            out.push_str(&format!("{:?}\n", child.elements));

            let continuation = if index == last { "    " } else { "│   " };
            let deeper = format!("{prefix}{continuation}");
            Self::write_children(child, &deeper, out);
        }
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// One step of a cursor's root-to-position path.
#[derive(Clone, Debug)]
struct Frame<T> {
    node: ReferenceCounter<Node<T>>,
    slot: usize,
}

impl<T> Frame<T> {
    fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    fn is_at_end(&self) -> bool {
        self.slot == self.node.elements.len()
    }

    fn value(&self) -> Option<&T> {
        self.node.elements.get(self.slot)
    }

    fn same_position(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.node, &other.node) && self.slot == other.slot
    }
}

/// A bidirectional position inside a [`BTreeSet`], stamped with the
/// generation of the graph it was drawn from.
///
/// Cursors are produced by [`BTreeSet::start`] and [`BTreeSet::end`] and
/// observed through the owning set ([`BTreeSet::element`],
/// [`BTreeSet::advance`], [`BTreeSet::retreat`]), which validates them
/// first: a cursor outlived by a mutation of its set, or handed to a set it
/// was not drawn from, is refused by panic rather than answered wrongly. A
/// cursor stays valid against any handle still sharing the unmutated graph,
/// and survives mutations of *other* handles that forked off it.
///
/// The path frames hold strong node references, so a live cursor pins its
/// version of the graph: the owning set's next mutation is forced through
/// path-copy and replaces the root, which is exactly what the validation
/// detects.
///
/// # Panics
///
/// Comparing cursors (`==`, `<`) validates them as a pair and panics when
/// they were drawn from different sets or different generations, or when
/// their shared generation is no longer the live one. The end cursor
/// compares greater than every positioned cursor.
#[derive(Clone, Debug)]
pub struct Cursor<T> {
    root: ReferenceCounter<Node<T>>,
    generation: u64,
    path: SmallVec<[Frame<T>; PATH_CAPACITY]>,
    current: Frame<T>,
}

impl<T> Cursor<T> {
    /// Descends into the child under `current`, landing on `slot` there.
    fn push(&mut self, slot: usize) {
        let child = ReferenceCounter::clone(&self.current.node.children[self.current.slot]);
        let parent = std::mem::replace(&mut self.current, Frame { node: child, slot });
        self.path.push(parent);
    }

    fn pop(&mut self) {
        self.current = match self.path.pop() {
            Some(frame) => frame,
            None => unreachable!("cursor unwound past the root of its set"),
        };
    }

    /// Moves to the next element in ascending order, or to the end state.
    fn advance_position(&mut self) {
        assert!(
            !self.current.is_at_end(),
            "cannot advance a cursor past the end"
        );
        self.current.slot += 1;
        if self.current.is_leaf() {
            while self.current.is_at_end() && !self.path.is_empty() {
                self.pop();
            }
        } else {
            while !self.current.is_leaf() {
                self.push(0);
            }
        }
    }

    /// Moves to the previous element in ascending order.
    fn retreat_position(&mut self) {
        if self.current.is_leaf() {
            while self.current.slot == 0 && !self.path.is_empty() {
                self.pop();
            }
            assert!(
                self.current.slot > 0,
                "cannot retreat a cursor before the start"
            );
            self.current.slot -= 1;
        } else {
            while !self.current.is_leaf() {
                let slot = {
                    let child = &self.current.node.children[self.current.slot];
                    if child.is_leaf() {
                        child.elements.len() - 1
                    } else {
                        child.elements.len()
                    }
                };
                self.push(slot);
            }
        }
    }

    /// Pair validation for comparisons: same graph, same generation, and
    /// that generation still live.
    fn validate_pair(left: &Self, right: &Self) {
        assert!(
            ReferenceCounter::ptr_eq(&left.root, &right.root),
            "cursors were drawn from different versions of the set"
        );
        assert!(
            left.generation == right.generation,
            "cursors have mismatched generations"
        );
        assert!(
            left.generation == left.root.mutation_count,
            "cursors outlived a mutation of their set"
        );
    }
}

impl<T> PartialEq for Cursor<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::validate_pair(self, other);
        self.current.same_position(&other.current)
    }
}

impl<T> Eq for Cursor<T> {}

impl<T: Ord> PartialOrd for Cursor<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for Cursor<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::validate_pair(self, other);
        match (self.current.value(), other.current.value()) {
            (Some(left), Some(right)) => left.cmp(right),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        }
    }
}

impl<T> BTreeSet<T> {
    /// Returns a cursor at the smallest element, or at the end when the set
    /// is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn start(&self) -> Cursor<T> {
        let mut cursor = Cursor {
            root: ReferenceCounter::clone(&self.root),
            generation: self.root.mutation_count,
            path: SmallVec::new(),
            current: Frame {
                node: ReferenceCounter::clone(&self.root),
                slot: 0,
            },
        };
        while !cursor.current.is_leaf() {
            cursor.push(0);
        }
        cursor
    }

    /// Returns the cursor one past the largest element.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn end(&self) -> Cursor<T> {
        Cursor {
            root: ReferenceCounter::clone(&self.root),
            generation: self.root.mutation_count,
            path: SmallVec::new(),
            current: Frame {
                node: ReferenceCounter::clone(&self.root),
                slot: self.root.elements.len(),
            },
        }
    }

    /// Checks that `cursor` was drawn from this set's live generation.
    ///
    /// A cursor pins its root, so a mutation of this set is forced through
    /// path-copy and replaces the root object; the identity check therefore
    /// catches staleness as well as cursors from unrelated sets. The
    /// generation comparison backs it up.
    fn validate_cursor(&self, cursor: &Cursor<T>) {
        assert!(
            ReferenceCounter::ptr_eq(&cursor.root, &self.root),
            "cursor does not match this version of the set"
        );
        assert!(
            cursor.generation == self.root.mutation_count,
            "cursor invalidated by a mutation of the set"
        );
    }

    /// Returns the element `cursor` points at.
    ///
    /// # Panics
    ///
    /// Panics when the cursor is stale or foreign (see [`Cursor`]) or when
    /// it points at the end of the set.
    #[must_use]
    pub fn element<'a>(&'a self, cursor: &'a Cursor<T>) -> &'a T {
        self.validate_cursor(cursor);
        match cursor.current.value() {
            Some(element) => element,
            None => panic!("cursor points at the end of the set"),
        }
    }

    /// Moves `cursor` to its successor: the next element in ascending
    /// order, or the end state after the largest element.
    ///
    /// # Complexity
    ///
    /// Amortized O(1) over a full traversal; O(log n) for a single step
    /// crossing node boundaries.
    ///
    /// # Panics
    ///
    /// Panics when the cursor is stale or foreign, or already at the end.
    pub fn advance(&self, cursor: &mut Cursor<T>) {
        self.validate_cursor(cursor);
        cursor.advance_position();
    }

    /// Moves `cursor` to its predecessor: the previous element in ascending
    /// order.
    ///
    /// # Complexity
    ///
    /// Amortized O(1) over a full traversal; O(log n) for a single step
    /// crossing node boundaries.
    ///
    /// # Panics
    ///
    /// Panics when the cursor is stale or foreign, or already at the start.
    pub fn retreat(&self, cursor: &mut Cursor<T>) {
        self.validate_cursor(cursor);
        cursor.retreat_position();
    }
}

// =============================================================================
// SortedSet Implementation
// =============================================================================

impl<T: Ord + Clone> SortedSet for BTreeSet<T> {
    type Element = T;
    type Iter<'a>
        = BTreeSetIterator<'a, T>
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
    fn iter(&self) -> BTreeSetIterator<'_, T> {
        Self::iter(self)
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over references to the elements of a [`BTreeSet`] in ascending
/// order.
///
/// Walks the tree with an explicit frame stack; each element is visited once
/// and each node entered once, so a full traversal is O(n).
pub struct BTreeSetIterator<'a, T> {
    stack: SmallVec<[(&'a Node<T>, usize); PATH_CAPACITY]>,
    remaining: usize,
}

impl<'a, T> BTreeSetIterator<'a, T> {
    fn descend_first(&mut self, mut node: &'a Node<T>) {
        loop {
            self.stack.push((node, 0));
            if node.is_leaf() {
                break;
            }
            node = &node.children[0];
        }
    }
}

impl<'a, T> Iterator for BTreeSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, slot)) = self.stack.last().copied() {
            if slot < node.elements.len() {
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                if !node.is_leaf() {
                    self.descend_first(&node.children[slot + 1]);
                }
                self.remaining -= 1;
                return Some(&node.elements[slot]);
            }
            self.stack.pop();
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for BTreeSetIterator<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for BTreeSetIterator<'_, T> {}

/// Iterator over references to the elements of a [`BTreeSet`] in descending
/// order.
pub struct BTreeSetDescendingIterator<'a, T> {
    stack: SmallVec<[(&'a Node<T>, usize); PATH_CAPACITY]>,
    remaining: usize,
}

impl<'a, T> BTreeSetDescendingIterator<'a, T> {
    fn descend_last(&mut self, mut node: &'a Node<T>) {
        loop {
            self.stack.push((node, node.elements.len()));
            if node.is_leaf() {
                break;
            }
            node = &node.children[node.elements.len()];
        }
    }
}

impl<'a, T> Iterator for BTreeSetDescendingIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, slot)) = self.stack.last().copied() {
            if slot > 0 {
                if let Some(top) = self.stack.last_mut() {
                    top.1 -= 1;
                }
                if !node.is_leaf() {
                    self.descend_last(&node.children[slot - 1]);
                }
                self.remaining -= 1;
                return Some(&node.elements[slot - 1]);
            }
            self.stack.pop();
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for BTreeSetDescendingIterator<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for BTreeSetDescendingIterator<'_, T> {}

/// An owning iterator over the elements of a [`BTreeSet`] in ascending
/// order.
pub struct BTreeSetIntoIterator<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Iterator for BTreeSetIntoIterator<T> {
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

impl<T> ExactSizeIterator for BTreeSetIntoIterator<T> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

/// Copies the handle, not the tree: the clone shares the entire node graph
/// in O(1), and the two handles diverge lazily through copy-on-write.
impl<T> Clone for BTreeSet<T> {
    fn clone(&self) -> Self {
        Self {
            root: ReferenceCounter::clone(&self.root),
            length: self.length,
        }
    }
}

impl<T> Default for BTreeSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> FromIterator<T> for BTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord + Clone> Extend<T> for BTreeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T: Ord + Clone> IntoIterator for BTreeSet<T> {
    type Item = T;
    type IntoIter = BTreeSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let elements: Vec<T> = self.iter().cloned().collect();
        BTreeSetIntoIterator {
            inner: elements.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a BTreeSet<T> {
    type Item = &'a T;
    type IntoIter = BTreeSetIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> PartialEq for BTreeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Ord> Eq for BTreeSet<T> {}

/// Computes a hash value for this set.
///
/// The hash covers the length and then every element in ascending order, so
/// neither insertion order nor node layout affects the hash, and equal sets
/// produce equal hash values (Hash-Eq consistency).
impl<T: Ord + Hash> Hash for BTreeSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BTreeSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for BTreeSet<T> {
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
