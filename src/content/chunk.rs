//! Chunk records produced by the chunker.

use std::fmt;

use bytes::Bytes;

/// A 32-byte BLAKE3 digest of one chunk's bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkHash([u8; 32]);

impl ChunkHash {
    /// The size of the hash in bytes.
    pub const SIZE: usize = 32;

    /// Creates a chunk hash from a byte array.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hashes `data` in one shot.
    pub fn of(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    /// Creates a chunk hash from a slice.
    ///
    /// Returns `None` if the slice is not exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(slice).ok().map(Self)
    }

    /// Returns the hash as a byte array.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the hash as a hex string.
    pub fn to_hex(&self) -> String {
        super::to_hex(&self.0)
    }
}

impl AsRef<[u8]> for ChunkHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<blake3::Hash> for ChunkHash {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash.into())
    }
}

impl fmt::Display for ChunkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ChunkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkHash({})", &self.to_hex()[..16])
    }
}

/// A content-defined chunk: where it sits in the stream and what it hashes to.
///
/// Boundaries depend only on content, so the same bytes chunk the same way
/// wherever they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Offset of the first byte in the original stream.
    pub offset: u64,

    /// Length in bytes.
    pub len: u64,

    /// BLAKE3 digest of the chunk bytes.
    pub hash: ChunkHash,
}

impl Chunk {
    /// Creates a chunk record.
    pub fn new(offset: u64, len: u64, hash: ChunkHash) -> Self {
        Self { offset, len, hash }
    }

    /// Returns true for the zero-length chunk of an empty stream.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }

    /// Returns the chunk as a byte range of the stream.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({} bytes @ {}, hash={})", self.len, self.offset, self.hash)
    }
}

/// A chunk record paired with its bytes.
///
/// Produced when chunking a reader or an in-memory buffer, for callers that
/// upload or store the chunks themselves.
#[derive(Debug, Clone)]
pub struct ChunkData {
    /// The chunk record.
    pub chunk: Chunk,

    /// The chunk bytes.
    pub data: Bytes,
}

impl ChunkData {
    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks the bytes against the recorded hash.
    pub fn verify(&self) -> bool {
        ChunkHash::of(&self.data) == self.chunk.hash
    }

    /// Splits into (record, bytes).
    pub fn into_parts(self) -> (Chunk, Bytes) {
        (self.chunk, self.data)
    }
}
