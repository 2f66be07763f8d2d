//! Streaming tree construction.

use tracing::trace;

use super::DedupNode;
use crate::content::Chunk;
use crate::error::{HashError, Result};

/// Builds a dedup tree from chunk leaves pushed in stream order.
///
/// Each level collects entries until it holds `fan_out` of them, then folds
/// them into one node pushed to the level above. `finish` folds what is left
/// bottom-up; a level left with a single entry promotes it unchanged instead
/// of wrapping it. The same leaf sequence and fan-out always give the same
/// root.
///
/// ```
/// use contenthash::{ChunkHash, DedupNode, NodeBuilder};
///
/// let mut builder = NodeBuilder::new(2)?;
/// for data in [&b"a"[..], b"b", b"c"] {
///     builder.push(DedupNode::chunk(ChunkHash::of(data), 1))?;
/// }
/// let root = builder.finish().unwrap();
/// assert_eq!(root.size(), 3);
/// assert_eq!(root.leaves().count(), 3);
/// # Ok::<(), contenthash::HashError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    fan_out: usize,
    levels: Vec<Vec<DedupNode>>,
}

impl NodeBuilder {
    /// Smallest fan-out that still builds a tree.
    pub const MIN_FAN_OUT: usize = 2;

    /// Creates a builder folding every `fan_out` entries into a node.
    pub fn new(fan_out: usize) -> Result<Self> {
        if fan_out < Self::MIN_FAN_OUT {
            return Err(HashError::InvalidConfig {
                message: "fan-out must be at least 2",
            });
        }
        Ok(Self::with_checked_fan_out(fan_out))
    }

    pub(crate) fn with_checked_fan_out(fan_out: usize) -> Self {
        debug_assert!(fan_out >= Self::MIN_FAN_OUT);
        Self {
            fan_out,
            levels: Vec::new(),
        }
    }

    /// Returns the fan-out.
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Returns true if nothing has been pushed since the last finish or reset.
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }

    /// Appends the next leaf (or prebuilt subtree) in stream order.
    pub fn push(&mut self, node: DedupNode) -> Result<()> {
        let mut carry = node;
        let mut level = 0;
        loop {
            if level == self.levels.len() {
                self.levels.try_reserve(1)?;
                self.levels.push(Vec::new());
            }
            let entries = &mut self.levels[level];
            entries.try_reserve(1)?;
            entries.push(carry);
            if entries.len() < self.fan_out {
                return Ok(());
            }

            carry = DedupNode::from_children(std::mem::take(entries));
            level += 1;
            trace!(level, "folded full level into node");
        }
    }

    /// Appends a chunk record as a leaf.
    pub fn push_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        self.push(DedupNode::from(chunk))
    }

    /// Folds the remaining levels and returns the root.
    ///
    /// Returns `None` if nothing was pushed. The builder is empty afterwards.
    pub fn finish(&mut self) -> Option<DedupNode> {
        let mut carry: Option<DedupNode> = None;
        for mut entries in std::mem::take(&mut self.levels) {
            // Lower levels hold later content than higher ones.
            entries.extend(carry.take());
            carry = match entries.len() {
                0 => None,
                1 => entries.pop(),
                _ => Some(DedupNode::from_children(entries)),
            };
        }
        carry
    }

    /// Discards everything pushed so far.
    pub fn reset(&mut self) {
        self.levels.clear();
    }
}
