//! Async support for hashing and chunking.
//!
//! Built on the `futures-io::AsyncRead` trait, so it is runtime-agnostic
//! and works with tokio (through `tokio-util`'s compat layer), async-std,
//! smol, and other async runtimes.
//!
//! - [`hash_async`] - Drives a content hasher from an async reader
//! - [`chunk_async`] - Creates an async stream of chunks from an async reader
//!
//! This module requires the `async-io` feature to be enabled.

mod hash;
mod stream;

pub use hash::{HashAsync, hash_async};
pub use stream::{ChunkStream, chunk_async};
