//! Chunking of readers and in-memory buffers.
//!
//! - [`ChunkIter`] - Iterator that yields [`ChunkData`] from a [`std::io::Read`] source
//! - [`Chunker::chunk_bytes`] - Zero-copy chunking of a [`Bytes`] buffer
//!
//! # Example
//!
//! ```no_run
//! use contenthash::{Chunker, ChunkerConfig};
//! use std::fs::File;
//!
//! let file = File::open("data.bin")?;
//! let chunker = Chunker::new(ChunkerConfig::default());
//!
//! for chunk in chunker.chunk(file) {
//!     let chunk = chunk?;
//!     println!("{}", chunk.chunk);
//! }
//! # Ok::<(), contenthash::HashError>(())
//! ```

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use super::Chunker;
use crate::buffer::ReadBuffer;
use crate::content::{Chunk, ChunkData};
use crate::error::HashError;

impl Chunker {
    /// Creates a chunking iterator over a reader.
    ///
    /// The iterator reads lazily and yields each chunk with its bytes as soon
    /// as its boundary is found.
    pub fn chunk<R: Read>(mut self, reader: R) -> ChunkIter<R> {
        self.reset();
        ChunkIter::new(reader, self)
    }

    /// Chunks an in-memory buffer as a whole stream.
    ///
    /// Chunk bytes are zero-copy slices of `data`. Any partial stream
    /// previously pushed into this chunker is discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use contenthash::{Chunker, ChunkerConfig};
    ///
    /// let mut chunker = Chunker::new(ChunkerConfig::default());
    /// let chunks = chunker.chunk_bytes(&b"hello world"[..]);
    ///
    /// assert_eq!(chunks.len(), 1);
    /// assert_eq!(&chunks[0].data[..], b"hello world");
    /// assert!(chunks[0].verify());
    /// ```
    pub fn chunk_bytes(&mut self, data: impl Into<Bytes>) -> Vec<ChunkData> {
        let data = data.into();
        self.reset();

        let mut chunks = Vec::new();
        let mut slice = |chunk: Chunk| {
            let range = chunk.offset as usize..chunk.end() as usize;
            chunks.push(ChunkData {
                chunk,
                data: data.slice(range),
            });
        };
        self.push_with(&data, &mut slice);
        if let Some(last) = self.finish() {
            slice(last);
        }
        chunks
    }
}

/// An iterator that yields chunks and their bytes from a reader.
///
/// Bytes of the chunk in progress are held until its boundary is found, so
/// memory use is bounded by `max_size` plus one read buffer.
pub struct ChunkIter<R> {
    reader: R,
    chunker: Chunker,
    buffer: ReadBuffer,
    pending: BytesMut,
    ready: VecDeque<Chunk>,
    finished: bool,
}

impl<R: Read> ChunkIter<R> {
    fn new(reader: R, chunker: Chunker) -> Self {
        Self {
            reader,
            pending: BytesMut::with_capacity(chunker.config().max_size()),
            chunker,
            buffer: ReadBuffer::take(),
            ready: VecDeque::new(),
            finished: false,
        }
    }
}

impl<R: Read> Iterator for ChunkIter<R> {
    type Item = Result<ChunkData, HashError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                let data = self.pending.split_to(chunk.len as usize).freeze();
                return Some(Ok(ChunkData { chunk, data }));
            }
            if self.finished {
                return None;
            }

            match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.finished = true;
                    self.ready.extend(self.chunker.finish());
                }
                Ok(n) => {
                    let bytes = &self.buffer[..n];
                    self.pending.extend_from_slice(bytes);
                    let ready = &mut self.ready;
                    self.chunker.push_with(bytes, |chunk| ready.push_back(chunk));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkerConfig;
    use crate::content::ChunkHash;
    use std::io::{self, Cursor};

    fn small() -> ChunkerConfig {
        ChunkerConfig::new(64, 256, 1024).unwrap()
    }

    fn data(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 31) ^ (i >> 5)) as u8).collect()
    }

    #[test]
    fn test_chunk_bytes_empty() {
        let chunks = Chunker::default().chunk_bytes(Bytes::new());
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
        assert_eq!(chunks[0].chunk.hash, ChunkHash::of(b""));
    }

    #[test]
    fn test_chunk_bytes_is_zero_copy() {
        let input = Bytes::from(data(20_000));
        let chunks = Chunker::new(small()).chunk_bytes(input.clone());

        let mut offset = 0usize;
        for chunk in &chunks {
            assert!(chunk.verify());
            assert_eq!(chunk.data.as_ptr(), input[offset..].as_ptr());
            offset += chunk.len();
        }
        assert_eq!(offset, input.len());
    }

    #[test]
    fn test_iterator_matches_chunk_bytes() {
        let input = data(20_000);
        let expected = Chunker::new(small()).chunk_bytes(input.clone());

        let chunks: Vec<_> = Chunker::new(small())
            .chunk(Cursor::new(&input))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(chunks.len(), expected.len());
        for (a, b) in chunks.iter().zip(&expected) {
            assert_eq!(a.chunk, b.chunk);
            assert_eq!(a.data, b.data);
        }
    }

    #[test]
    fn test_iterator_empty_reader() {
        let chunks: Vec<_> = Chunker::default()
            .chunk(io::empty())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk.len, 0);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn test_iterator_reports_read_error() {
        let mut iter = Chunker::default().chunk(FailingReader);
        assert!(matches!(iter.next(), Some(Err(HashError::Io(_)))));
        assert!(iter.next().is_none());
    }
}
