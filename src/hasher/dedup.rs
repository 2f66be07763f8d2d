//! Chunk-tree content hashing.
//!
//! The stream is cut into content-defined chunks, each chunk hashed with
//! BLAKE3, and the chunk hashes folded into a [`DedupNode`] tree. The
//! address is the 32-byte root hash followed by one tag byte saying whether
//! the root is a chunk or a node, and for nodes which chunk size family
//! produced it.

use super::{Blake3Hasher, ContentHasher, Finalized, HashOutput};
use crate::chunker::Chunker;
use crate::config::ChunkerConfig;
use crate::content::{Chunk, ContentHash};
use crate::error::{HashError, Result};
use crate::hash_type::HashType;
use crate::node::{DedupNode, NodeBuilder};

/// Tag byte of an address whose root is a single chunk.
pub const CHUNK_TAG: u8 = 0x01;

/// Tag byte of a node root built from 64 KiB-average chunks.
pub const NODE_TAG_64K: u8 = 0x02;

/// Tag byte of a node root built from 1024 KiB-average chunks.
pub const NODE_TAG_1024K: u8 = 0x04;

/// Chunking and tree parameters of one dedup algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupParams {
    chunking: Option<ChunkerConfig>,
    fan_out: usize,
    node_tag: u8,
    always_node: bool,
}

impl DedupParams {
    /// The whole stream is one chunk; the address is its hash.
    pub const SINGLE_CHUNK: DedupParams = DedupParams {
        chunking: None,
        fan_out: 512,
        node_tag: NODE_TAG_64K,
        always_node: false,
    };

    /// 64 KiB-average chunks; the root is always a node, even over one chunk.
    pub const NODE_64K: DedupParams = DedupParams {
        chunking: Some(ChunkerConfig::CHUNK_64K),
        fan_out: 512,
        node_tag: NODE_TAG_64K,
        always_node: true,
    };

    /// 64 KiB-average chunks; a single-chunk stream addresses as that chunk.
    pub const NODE_OR_CHUNK_64K: DedupParams = DedupParams {
        chunking: Some(ChunkerConfig::CHUNK_64K),
        fan_out: 512,
        node_tag: NODE_TAG_64K,
        always_node: false,
    };

    /// 1024 KiB-average chunks; a single-chunk stream addresses as that chunk.
    pub const NODE_OR_CHUNK_1024K: DedupParams = DedupParams {
        chunking: Some(ChunkerConfig::CHUNK_1024K),
        fan_out: 256,
        node_tag: NODE_TAG_1024K,
        always_node: false,
    };

    /// Replaces the chunk sizes.
    pub fn with_chunking(mut self, config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        self.chunking = Some(config);
        Ok(self)
    }

    /// Replaces the tree fan-out.
    pub fn with_fan_out(mut self, fan_out: usize) -> Result<Self> {
        NodeBuilder::new(fan_out)?;
        self.fan_out = fan_out;
        Ok(self)
    }

    /// Returns the chunk sizes, or `None` when the stream is one chunk.
    pub fn chunking(&self) -> Option<&ChunkerConfig> {
        self.chunking.as_ref()
    }

    /// Returns the maximum children per node.
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Returns the tag byte appended to a node root.
    pub fn node_tag(&self) -> u8 {
        self.node_tag
    }

    /// Returns true if a single-chunk root is still wrapped in a node.
    pub fn always_node(&self) -> bool {
        self.always_node
    }
}

/// Content hasher for the dedup algorithms.
///
/// Alongside the address, `finalize` returns every chunk record and the
/// root of the node tree, for callers that store chunks individually.
///
/// ```
/// use contenthash::{ContentHasher, DedupHasher, DedupParams, HashType};
///
/// let mut hasher = DedupHasher::with_params(HashType::Dedup64K, DedupParams::NODE_OR_CHUNK_64K);
/// hasher.update(b"hello")?;
/// let output = hasher.finalize()?;
///
/// assert_eq!(output.chunks.len(), 1);
/// assert_eq!(output.hash.len(), 33);
/// // One chunk: the address is the chunk hash plus the chunk tag.
/// assert_eq!(&output.hash.as_bytes()[..32], output.chunks[0].hash.as_bytes());
/// assert_eq!(output.hash.as_bytes()[32], contenthash::CHUNK_TAG);
/// # Ok::<(), contenthash::HashError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DedupHasher {
    hash_type: HashType,
    params: DedupParams,
    chunker: Option<Chunker>,
    whole: Blake3Hasher,
    builder: NodeBuilder,
    chunks: Vec<Chunk>,
    length: u64,
    finalized: Finalized,
}

impl DedupHasher {
    /// Creates a hasher producing addresses tagged with `hash_type`.
    pub fn with_params(hash_type: HashType, params: DedupParams) -> Self {
        Self {
            hash_type: hash_type.canonical(),
            params,
            chunker: params.chunking.map(Chunker::new),
            whole: Blake3Hasher::new(),
            builder: NodeBuilder::with_checked_fan_out(params.fan_out),
            chunks: Vec::new(),
            length: 0,
            finalized: Finalized::default(),
        }
    }

    /// Returns the parameters.
    pub fn params(&self) -> &DedupParams {
        &self.params
    }

    fn record(chunks: &mut Vec<Chunk>, builder: &mut NodeBuilder, chunk: Chunk) -> Result<()> {
        chunks.try_reserve(1)?;
        chunks.push(chunk);
        builder.push_chunk(&chunk)
    }
}

impl ContentHasher for DedupHasher {
    fn hash_type(&self) -> HashType {
        self.hash_type
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.finalized.check_open("update after finalize")?;
        self.length += data.len() as u64;

        let Self {
            chunker,
            whole,
            chunks,
            builder,
            ..
        } = self;
        match chunker {
            Some(chunker) => {
                let mut failed = None;
                chunker.push_with(data, |chunk| {
                    if failed.is_none() {
                        failed = Self::record(chunks, builder, chunk).err();
                    }
                });
                failed.map_or(Ok(()), Err)
            }
            None => {
                whole.update(data);
                Ok(())
            }
        }
    }

    fn finalize(&mut self) -> Result<HashOutput> {
        self.finalized.close()?;

        let last = match &mut self.chunker {
            Some(chunker) => chunker.finish(),
            None => Some(Chunk::new(0, self.length, self.whole.finalize())),
        };
        if let Some(chunk) = last {
            Self::record(&mut self.chunks, &mut self.builder, chunk)?;
        }

        let mut root = self
            .builder
            .finish()
            .ok_or(HashError::InvalidState("stream produced no chunks"))?;
        if self.params.always_node && root.is_chunk() {
            root = DedupNode::from_children(vec![root]);
        }

        let tag = if root.is_chunk() {
            CHUNK_TAG
        } else {
            self.params.node_tag
        };
        let mut digest = [0u8; 33];
        digest[..32].copy_from_slice(root.hash().as_bytes());
        digest[32] = tag;

        Ok(HashOutput {
            hash: ContentHash::new(self.hash_type, &digest)?,
            length: self.length,
            chunks: std::mem::take(&mut self.chunks),
            node: Some(root),
        })
    }

    fn reset(&mut self) {
        if let Some(chunker) = &mut self.chunker {
            chunker.reset();
        }
        self.whole.reset();
        self.builder.reset();
        self.chunks.clear();
        self.length = 0;
        self.finalized.reopen();
    }
}
