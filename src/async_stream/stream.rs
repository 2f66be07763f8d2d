//! Async stream adapter for chunking.
//!
//! # Example
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use contenthash::{chunk_async, ChunkerConfig};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), contenthash::HashError> {
//!     let mut stream = chunk_async(reader, ChunkerConfig::default());
//!
//!     while let Some(chunk) = stream.next().await {
//!         let chunk = chunk?;
//!         println!("{}", chunk.chunk);
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::ReadBuffer;
use crate::chunker::Chunker;
use crate::config::ChunkerConfig;
use crate::content::{Chunk, ChunkData};
use crate::error::HashError;

pin_project! {
    /// A stream that yields chunks and their bytes from an async reader.
    ///
    /// Produces exactly the chunks the synchronous [`Chunker`] produces for
    /// the same bytes.
    pub struct ChunkStream<R> {
        #[pin]
        reader: R,
        chunker: Chunker,
        buffer: ReadBuffer,
        pending: BytesMut,
        ready: VecDeque<Chunk>,
        finished: bool,
    }
}

/// Creates an async stream of chunks from an async reader.
pub fn chunk_async<R: AsyncRead>(reader: R, config: ChunkerConfig) -> ChunkStream<R> {
    ChunkStream {
        reader,
        chunker: Chunker::new(config),
        buffer: ReadBuffer::take(),
        pending: BytesMut::with_capacity(config.max_size()),
        ready: VecDeque::new(),
        finished: false,
    }
}

impl<R: AsyncRead> Stream for ChunkStream<R> {
    type Item = Result<ChunkData, HashError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(chunk) = this.ready.pop_front() {
                let data = this.pending.split_to(chunk.len as usize).freeze();
                return Poll::Ready(Some(Ok(ChunkData { chunk, data })));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            match this.reader.as_mut().poll_read(cx, &mut this.buffer[..]) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(0)) => {
                    *this.finished = true;
                    this.ready.extend(this.chunker.finish());
                }
                Poll::Ready(Ok(n)) => {
                    let bytes = &this.buffer[..n];
                    this.pending.extend_from_slice(bytes);
                    let ready = &mut *this.ready;
                    this.chunker.push_with(bytes, |chunk| ready.push_back(chunk));
                }
                Poll::Ready(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
            }
        }
    }
}
