//! Streaming content-defined chunking engine.
//!
//! [`Chunker`] consumes a byte stream in arbitrarily sized pieces and emits
//! a [`Chunk`] record for every boundary it finds. Chunk bytes are hashed
//! with BLAKE3 as they pass through, so the engine never buffers data.
//!
//! # Example
//!
//! ```
//! use contenthash::{Chunker, ChunkerConfig};
//!
//! let mut chunker = Chunker::new(ChunkerConfig::new(64, 256, 1024)?);
//!
//! // Feed data in any size
//! let mut chunks = chunker.push(&[1u8; 3000]);
//! chunks.extend(chunker.push(&[2u8; 10]));
//!
//! // When the stream ends, flush the trailing chunk
//! chunks.extend(chunker.finish());
//!
//! let total: u64 = chunks.iter().map(|c| c.len).sum();
//! assert_eq!(total, 3010);
//! # Ok::<(), contenthash::HashError>(())
//! ```

use tracing::trace;

use crate::cdc::{RollingHash, WINDOW_SIZE};
use crate::config::ChunkerConfig;
use crate::content::Chunk;
use crate::hasher::Blake3Hasher;

/// A streaming content-defined chunker.
///
/// A boundary is declared after a byte when the chunk so far is at least
/// `min_size` long and the rolling fingerprint of the last [`WINDOW_SIZE`]
/// bytes is at most [`ChunkerConfig::boundary_threshold`], or when the
/// chunk reaches `max_size`. The fingerprint restarts at every boundary.
///
/// # Determinism
///
/// Identical byte streams produce identical chunks regardless of:
/// - How many bytes are pushed at once (1 byte vs 1MB)
/// - Number of `push()` calls
///
/// Because the fingerprint depends only on the window contents, a boundary
/// shifts along with the bytes around it when data is inserted earlier in
/// the stream.
///
/// # Empty streams
///
/// A stream that ends without any data yields exactly one zero-length chunk
/// from `finish()`, hashed as BLAKE3 of the empty string.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    rolling: RollingHash,
    threshold: u64,
    hasher: Blake3Hasher,
    chunk_len: usize,
    offset: u64,
    emitted: bool,
}

impl Chunker {
    /// Creates a new chunker with the given configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use contenthash::{Chunker, ChunkerConfig};
    ///
    /// let chunker = Chunker::new(ChunkerConfig::default());
    /// assert_eq!(chunker.offset(), 0);
    /// ```
    pub fn new(config: ChunkerConfig) -> Self {
        Self {
            config,
            rolling: RollingHash::new(),
            threshold: config.boundary_threshold(),
            hasher: Blake3Hasher::new(),
            chunk_len: 0,
            offset: 0,
            emitted: false,
        }
    }

    /// Feeds the next piece of the stream and returns the chunks it completes.
    pub fn push(&mut self, data: &[u8]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        self.push_with(data, |chunk| chunks.push(chunk));
        chunks
    }

    /// Feeds the next piece of the stream, calling `emit` for each chunk it
    /// completes, in stream order.
    ///
    /// Avoids the intermediate `Vec` of [`push`](Self::push).
    pub fn push_with<F>(&mut self, data: &[u8], mut emit: F)
    where
        F: FnMut(Chunk),
    {
        let mut start = 0;
        while start < data.len() {
            match self.scan(&data[start..]) {
                Some(len) => {
                    self.hasher.update(&data[start..start + len]);
                    emit(self.cut());
                    start += len;
                }
                None => {
                    self.hasher.update(&data[start..]);
                    break;
                }
            }
        }
    }

    /// Ends the stream and returns the trailing chunk, if any.
    ///
    /// Returns `None` when the stream ended exactly on a boundary. An empty
    /// stream returns the zero-length chunk. The chunker is reset afterwards
    /// and can be reused for a new stream.
    pub fn finish(&mut self) -> Option<Chunk> {
        let last = if self.chunk_len > 0 || !self.emitted {
            Some(self.cut())
        } else {
            None
        };
        self.reset();
        last
    }

    /// Resets the chunker for a new stream.
    pub fn reset(&mut self) {
        self.rolling.reset();
        self.hasher.reset();
        self.chunk_len = 0;
        self.offset = 0;
        self.emitted = false;
    }

    /// Returns the stream offset of the next chunk to be emitted.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns how many bytes of the current chunk have been consumed.
    pub fn pending_len(&self) -> usize {
        self.chunk_len
    }

    /// Returns the configuration used by this chunker.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Consumes bytes up to and including the next boundary.
    ///
    /// Returns the number of bytes of `data` belonging to the current chunk
    /// when a boundary falls inside `data`, `None` if all of it does.
    fn scan(&mut self, data: &[u8]) -> Option<usize> {
        let min = self.config.min_size();
        let max = self.config.max_size();
        let mut i = 0;

        // Bytes more than a window before min_size never reach a tested
        // fingerprint, so they only count towards the length.
        let roll_from = min - WINDOW_SIZE;
        if self.chunk_len < roll_from {
            let skip = (roll_from - self.chunk_len).min(data.len());
            self.chunk_len += skip;
            i = skip;
        }

        while i < data.len() {
            let fingerprint = self.rolling.roll(data[i]);
            self.chunk_len += 1;
            i += 1;

            if self.chunk_len >= max {
                trace!(len = self.chunk_len, "forced boundary at max size");
                return Some(i);
            }
            if self.chunk_len >= min && fingerprint <= self.threshold {
                return Some(i);
            }
        }
        None
    }

    fn cut(&mut self) -> Chunk {
        let len = self.chunk_len as u64;
        let chunk = Chunk::new(self.offset, len, self.hasher.finalize_reset());
        self.offset += len;
        self.chunk_len = 0;
        self.rolling.reset();
        self.emitted = true;
        chunk
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}
