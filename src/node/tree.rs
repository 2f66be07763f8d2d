//! The node tree itself.

use std::fmt;

use crate::content::{Chunk, ChunkHash};
use crate::hasher::Blake3Hasher;

const ENTRY_SIZE: usize = 1 + ChunkHash::SIZE + 8;

/// Whether a node is a chunk leaf or an interior node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    /// A leaf naming one chunk.
    Chunk = 0x01,

    /// An interior node over its children.
    Node = 0x02,
}

/// One node of a dedup tree.
///
/// A leaf's hash is the chunk's BLAKE3 hash. An interior node's hash is the
/// BLAKE3 hash of its children serialized in order, each as
///
/// ```text
/// kind (1 byte) || hash (32 bytes) || size (8 bytes, big-endian)
/// ```
///
/// Offsets are not part of the hash, so a subtree hashes the same wherever
/// it occurs in a stream.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DedupNode {
    kind: NodeKind,
    hash: ChunkHash,
    size: u64,
    children: Vec<DedupNode>,
}

impl DedupNode {
    /// Bytes one child contributes to its parent's serialized form.
    pub const SERIALIZED_CHILD_SIZE: usize = ENTRY_SIZE;

    /// Creates a leaf for a chunk of `size` bytes.
    pub fn chunk(hash: ChunkHash, size: u64) -> Self {
        Self {
            kind: NodeKind::Chunk,
            hash,
            size,
            children: Vec::new(),
        }
    }

    /// Creates an interior node over `children`, in stream order.
    pub fn from_children(children: Vec<DedupNode>) -> Self {
        let mut hasher = Blake3Hasher::new();
        let mut size = 0u64;
        for child in &children {
            hasher.update(&child.serialized_entry());
            size += child.size;
        }
        Self {
            kind: NodeKind::Node,
            hash: hasher.finalize(),
            size,
            children,
        }
    }

    /// Returns the node kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns true for a chunk leaf.
    pub fn is_chunk(&self) -> bool {
        self.kind == NodeKind::Chunk
    }

    /// Returns the node hash.
    pub fn hash(&self) -> &ChunkHash {
        &self.hash
    }

    /// Returns the total byte length covered by this node.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the direct children. Empty for a leaf.
    pub fn children(&self) -> &[DedupNode] {
        &self.children
    }

    /// Returns the number of levels below and including this node, for
    /// trees produced by [`NodeBuilder`](super::NodeBuilder).
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self;
        // In a built tree the first child always roots the deepest subtree.
        while let Some(first) = node.children.first() {
            height += 1;
            node = first;
        }
        height
    }

    /// Serializes the children in the form the node hash is computed over.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.children.len() * Self::SERIALIZED_CHILD_SIZE);
        for child in &self.children {
            out.extend_from_slice(&child.serialized_entry());
        }
        out
    }

    /// Iterates the chunk leaves in stream order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            root: Some(self),
            stack: Vec::new(),
        }
    }

    /// Rebuilds the chunk list, assigning offsets from leaf order.
    pub fn chunks(&self) -> Vec<Chunk> {
        let mut offset = 0u64;
        self.leaves()
            .map(|leaf| {
                let chunk = Chunk::new(offset, leaf.size, leaf.hash);
                offset += leaf.size;
                chunk
            })
            .collect()
    }

    fn serialized_entry(&self) -> [u8; ENTRY_SIZE] {
        let mut entry = [0u8; ENTRY_SIZE];
        entry[0] = self.kind as u8;
        entry[1..33].copy_from_slice(self.hash.as_bytes());
        entry[33..].copy_from_slice(&self.size.to_be_bytes());
        entry
    }
}

impl From<&Chunk> for DedupNode {
    fn from(chunk: &Chunk) -> Self {
        Self::chunk(chunk.hash, chunk.len)
    }
}

impl fmt::Debug for DedupNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DedupNode")
            .field("kind", &self.kind)
            .field("hash", &self.hash)
            .field("size", &self.size)
            .field("children", &self.children.len())
            .finish()
    }
}

/// In-order iterator over the chunk leaves of a tree.
///
/// Walks with an explicit stack, so tree depth never grows the call stack.
pub struct Leaves<'a> {
    root: Option<&'a DedupNode>,
    stack: Vec<std::slice::Iter<'a, DedupNode>>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a DedupNode;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            if root.is_chunk() {
                return Some(root);
            }
            self.stack.push(root.children.iter());
        }

        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) if node.is_chunk() => return Some(node),
                Some(node) => self.stack.push(node.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
