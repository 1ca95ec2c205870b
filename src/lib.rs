//! # cowset
//!
//! Ordered-set implementation strategies for unique, totally-ordered
//! elements, built around a copy-on-write B-tree.
//!
//! ## Overview
//!
//! Every strategy in this crate implements the same [`SortedSet`] contract
//! and differs only in how it stores elements internally:
//!
//! - [`SortedVecSet`]: Sorted vector with binary search (the baseline)
//! - [`AlgebraicSet`]: Persistent red-black tree (purely functional inserts)
//! - [`BTreeSet`]: Copy-on-write B-tree with in-place mutation of
//!   exclusively owned nodes and generation-validated cursors (the core)
//!
//! ## Structural Sharing
//!
//! Cloning a [`BTreeSet`] or an [`AlgebraicSet`] is O(1): the clone shares
//! the original's node graph. A later mutation copies only the nodes on the
//! path it touches, so the two handles diverge at O(log n) cost while the
//! untouched subtrees remain shared.
//!
//! ```rust
//! use cowset::prelude::*;
//!
//! let first: BTreeSet<i32> = (0..100).collect();
//! let mut second = first.clone(); // O(1), shares every node
//!
//! second.insert(100);
//! assert_eq!(first.len(), 100);  // Original unchanged
//! assert_eq!(second.len(), 101); // New version
//! assert!(!first.contains(&100));
//! assert!(second.contains(&100));
//! ```
//!
//! ## Feature Flags
//!
//! - `arc`: Use `Arc` instead of `Rc` for node references, making the
//!   containers `Send + Sync` for shareable element types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
///
/// Exclusive ownership of a node is probed with [`ReferenceCounter::get_mut`];
/// in-place mutation is permitted only while the probe succeeds.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod algebraic;
mod array;
mod btree;
mod set;

pub use algebraic::AlgebraicSet;
pub use algebraic::AlgebraicSetIntoIterator;
pub use algebraic::AlgebraicSetIterator;
pub use array::SortedVecSet;
pub use array::SortedVecSetIntoIterator;
pub use array::SortedVecSetIterator;
pub use btree::BTreeSet;
pub use btree::BTreeSetDescendingIterator;
pub use btree::BTreeSetIntoIterator;
pub use btree::BTreeSetIterator;
pub use btree::Cursor;
pub use btree::DEFAULT_ORDER;
pub use set::Insertion;
pub use set::SortedSet;

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use cowset::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AlgebraicSet;
    pub use crate::BTreeSet;
    pub use crate::Cursor;
    pub use crate::Insertion;
    pub use crate::SortedSet;
    pub use crate::SortedVecSet;
}

// =============================================================================
// Tests
// =============================================================================
