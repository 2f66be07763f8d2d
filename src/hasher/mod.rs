//! Content hashers.
//!
//! Every algorithm is driven through the same [`ContentHasher`] interface:
//! feed buffers with `update`, call `finalize` once, `reset` before reuse.
//!
//! - [`DigestHasher`] - Any RustCrypto `Digest` (SHA-1, SHA-256, MD5)
//! - [`Xxh3Hasher`] - Non-cryptographic XXH3-128
//! - [`VsoHasher`] - Paged and blocked SHA-256 blob identifier
//! - [`DedupHasher`] - Content-defined chunk tree
//! - [`Blake3Hasher`] - BLAKE3 primitive under chunk and node hashes

mod blake3;
mod dedup;
mod digest;
mod vso;
mod xxh3;

use std::io::{ErrorKind, Read};

use crate::buffer::ReadBuffer;
use crate::content::{Chunk, ContentHash};
use crate::error::{HashError, Result};
use crate::hash_type::HashType;
use crate::node::DedupNode;

pub use self::blake3::Blake3Hasher;
pub use self::dedup::{CHUNK_TAG, DedupHasher, DedupParams, NODE_TAG_64K, NODE_TAG_1024K};
pub use self::digest::DigestHasher;
pub use self::vso::{VsoHasher, BLOCK_SIZE, PAGE_SIZE};
pub use self::xxh3::Xxh3Hasher;

/// Result of finalizing a content hasher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOutput {
    /// The content address.
    pub hash: ContentHash,

    /// Total number of bytes hashed.
    pub length: u64,

    /// Chunk boundaries and per-chunk hashes, in stream order.
    ///
    /// Empty for single-pass algorithms.
    pub chunks: Vec<Chunk>,

    /// Root of the dedup node tree, for chunking algorithms.
    pub node: Option<DedupNode>,
}

impl HashOutput {
    /// Creates an output for a single-pass algorithm.
    pub fn single_pass(hash: ContentHash, length: u64) -> Self {
        Self {
            hash,
            length,
            chunks: Vec::new(),
            node: None,
        }
    }
}

/// A stateful hasher that consumes a byte stream incrementally.
///
/// Finalization is single-use: after `finalize`, both `update` and another
/// `finalize` fail with [`HashError::InvalidState`] until `reset` is called.
/// A reset hasher is indistinguishable from a freshly constructed one.
pub trait ContentHasher: Send {
    /// Returns the canonical hash type this hasher produces.
    fn hash_type(&self) -> HashType;

    /// Returns the digest length in bytes.
    fn byte_length(&self) -> usize {
        self.hash_type().byte_length()
    }

    /// Feeds the next buffer of the stream.
    fn update(&mut self, data: &[u8]) -> Result<()>;

    /// Completes the stream and returns its address.
    fn finalize(&mut self) -> Result<HashOutput>;

    /// Returns the hasher to its initial state.
    fn reset(&mut self);

    /// Hashes one in-memory buffer as a whole stream.
    fn hash_bytes(&mut self, data: &[u8]) -> Result<ContentHash> {
        self.update(data)?;
        Ok(self.finalize()?.hash)
    }
}

impl<H: ContentHasher + ?Sized> ContentHasher for Box<H> {
    fn hash_type(&self) -> HashType {
        (**self).hash_type()
    }

    fn byte_length(&self) -> usize {
        (**self).byte_length()
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        (**self).update(data)
    }

    fn finalize(&mut self) -> Result<HashOutput> {
        (**self).finalize()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Reads `reader` to the end through `hasher` and finalizes it.
///
/// Reads go through a thread-local reusable buffer.
pub fn hash_reader<H, R>(hasher: &mut H, mut reader: R) -> Result<HashOutput>
where
    H: ContentHasher + ?Sized,
    R: Read,
{
    let mut buffer = ReadBuffer::take();
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n])?,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    hasher.finalize()
}

/// Tracks the single-use finalize rule shared by every adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Finalized(bool);

impl Finalized {
    pub(crate) fn check_open(&self, op: &'static str) -> Result<()> {
        if self.0 {
            Err(HashError::InvalidState(op))
        } else {
            Ok(())
        }
    }

    /// Marks the hasher finalized, failing if it already was.
    pub(crate) fn close(&mut self) -> Result<()> {
        self.check_open("finalize called twice without reset")?;
        self.0 = true;
        Ok(())
    }

    pub(crate) fn reopen(&mut self) {
        self.0 = false;
    }
}
