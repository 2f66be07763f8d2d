//! contenthash
//!
//! Content hashing core for build caches and content-addressable stores.
//!
//! Every blob a cache stores is named by a [`ContentHash`]: a stable hash
//! type identifier plus a digest. This crate turns bytes into those
//! addresses:
//!
//! - a closed registry of hash algorithms ([`HashType`], [`HashRegistry`])
//! - streaming hashers behind one interface ([`ContentHasher`])
//! - thread-safe pools that recycle hashers ([`ContentHasherPool`], [`HasherPools`])
//! - content-defined chunking ([`Chunker`])
//! - dedup node trees over chunk hashes ([`DedupNode`], [`NodeBuilder`])
//!
//! The crate intentionally:
//! - does NOT store, upload or look up content
//! - does NOT manage files or paths
//! - does NOT spawn threads
//!
//! It only does one thing: **Bytes → content address**
//!
//! # Sync
//!
//! ```
//! use contenthash::{HashType, HasherPools};
//!
//! let pools = HasherPools::default();
//!
//! let sha = pools.hash_bytes(HashType::Sha256, b"hello world")?;
//! assert_eq!(sha.len(), 32);
//!
//! let output = pools.hash_reader(HashType::Dedup64K, &b"hello world"[..])?;
//! assert_eq!(output.chunks.len(), 1);
//! println!("{}", output.hash);
//! # Ok::<(), contenthash::HashError>(())
//! ```
//!
//! # Async (feature = "async-io")
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
//!         println!("chunk {}", chunk.chunk);
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunker;
mod config;
mod content;
mod error;
mod hash_type;
mod hasher;
mod node;
mod pool;

mod buffer; // internal (thread-local reuse)
mod cdc; // internal rolling fingerprint

#[cfg(feature = "async-io")]
mod async_stream;

pub use cdc::{RollingHash, WINDOW_SIZE};
pub use chunker::{ChunkIter, Chunker};
pub use config::{
    AVG_CHUNK_SIZE_64K, AVG_CHUNK_SIZE_1024K, ChunkerConfig, IdleLimit, MAX_CHUNK_SIZE_64K,
    MAX_CHUNK_SIZE_1024K, MIN_CHUNK_SIZE_64K, MIN_CHUNK_SIZE_1024K, PoolConfig,
};
pub use content::{Chunk, ChunkData, ChunkHash, ContentHash, MAX_HASH_LENGTH};
pub use error::{HashError, Result};
pub use hash_type::{
    DEDUP_1024K_INFO, DEDUP_64K_INFO, DEDUP_NODE_INFO, DEDUP_SINGLE_CHUNK_INFO, HashInfo,
    HashRegistry, HashType, HasherFactory, MD5_INFO, SHA1_INFO, SHA256_INFO, VSO0_INFO, XXH3_INFO,
};
pub use hasher::{
    BLOCK_SIZE, Blake3Hasher, CHUNK_TAG, ContentHasher, DedupHasher, DedupParams, DigestHasher,
    HashOutput, NODE_TAG_64K, NODE_TAG_1024K, PAGE_SIZE, VsoHasher, Xxh3Hasher, hash_reader,
};
pub use node::{DedupNode, Leaves, NodeBuilder, NodeKind};
pub use pool::{ContentHasherPool, HasherPools, PoolStats, PooledHasher};

#[cfg(feature = "async-io")]
pub use async_stream::{ChunkStream, HashAsync, chunk_async, hash_async};
