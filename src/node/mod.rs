//! Dedup node trees.
//!
//! Chunk hashes are folded into a bounded fan-out Merkle tree whose root is
//! the content address of the dedup algorithms.
//!
//! - [`DedupNode`] - A chunk leaf or an interior node over its children
//! - [`NodeBuilder`] - Streaming bottom-up tree construction
//! - [`Leaves`] - In-order iterator over a tree's chunk leaves

mod builder;
mod tree;

pub use builder::NodeBuilder;
pub use tree::{DedupNode, Leaves, NodeKind};
