//! In-memory snapshot of a directory hierarchy.
//!
//! Nodes live in an arena owned by [`Tree`] and are addressed by
//! [`LeafId`]. A tree only grows while it is being gathered and is torn
//! down in one pass with [`Tree::reclaim`].

mod tree;

pub use tree::{Leaf, LeafId, Tree};
