//! Async reader hashing.

use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::ReadBuffer;
use crate::error::{HashError, Result};
use crate::hasher::{ContentHasher, HashOutput};

pin_project! {
    /// Future returned by [`hash_async`].
    #[must_use = "futures do nothing unless polled"]
    pub struct HashAsync<'a, R> {
        #[pin]
        reader: R,
        hasher: &'a mut dyn ContentHasher,
        buffer: ReadBuffer,
        done: bool,
    }
}

/// Reads `reader` to the end through `hasher` and finalizes it.
///
/// Works with a pooled hasher as well as a bare one:
///
/// ```ignore
/// use contenthash::{hash_async, HashType, HasherPools};
/// use tokio_util::compat::TokioAsyncReadCompatExt;
///
/// async fn digest(pools: &HasherPools, file: tokio::fs::File) -> contenthash::Result<()> {
///     let mut hasher = pools.acquire(HashType::Dedup64K)?;
///     let output = hash_async(file.compat(), &mut hasher).await?;
///     println!("{} in {} chunks", output.hash, output.chunks.len());
///     Ok(())
/// }
/// ```
pub fn hash_async<R: AsyncRead>(reader: R, hasher: &mut dyn ContentHasher) -> HashAsync<'_, R> {
    HashAsync {
        reader,
        hasher,
        buffer: ReadBuffer::take(),
        done: false,
    }
}

impl<R: AsyncRead> Future for HashAsync<'_, R> {
    type Output = Result<HashOutput>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(Err(HashError::InvalidState("future polled after completion")));
        }

        loop {
            let n = match this.reader.as_mut().poll_read(cx, &mut this.buffer[..]) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(n)) => n,
                Poll::Ready(Err(e)) if e.kind() == ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Err(e.into()));
                }
            };

            let result = if n == 0 {
                this.hasher.finalize().map(Some)
            } else {
                this.hasher.update(&this.buffer[..n]).map(|()| None)
            };
            match result {
                Ok(None) => {}
                Ok(Some(output)) => {
                    *this.done = true;
                    return Poll::Ready(Ok(output));
                }
                Err(e) => {
                    *this.done = true;
                    return Poll::Ready(Err(e));
                }
            }
        }
    }
}
