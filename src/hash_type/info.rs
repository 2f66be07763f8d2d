//! Algorithm descriptors.

use std::fmt;

use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;

use super::HashType;
use crate::hasher::{ContentHasher, DedupHasher, DedupParams, DigestHasher, VsoHasher, Xxh3Hasher};

/// Builds a fresh hasher in its initial state.
pub type HasherFactory = fn() -> Box<dyn ContentHasher>;

/// Immutable metadata for one hash algorithm.
///
/// Descriptors are `static` items shared read-only by every caller. An alias
/// identifier resolves to the same descriptor as its canonical identifier.
pub struct HashInfo {
    hash_type: HashType,
    byte_length: usize,
    name: &'static str,
    factory: HasherFactory,
}

impl HashInfo {
    const fn new(hash_type: HashType, factory: HasherFactory) -> Self {
        Self {
            hash_type,
            byte_length: hash_type.byte_length(),
            name: hash_type.name(),
            factory,
        }
    }

    /// Returns the canonical hash type.
    pub fn hash_type(&self) -> HashType {
        self.hash_type
    }

    /// Returns the digest length in bytes.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Returns the display token.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the factory function.
    pub fn factory(&self) -> HasherFactory {
        self.factory
    }

    /// Constructs a new content hasher for this algorithm.
    pub fn create_content_hasher(&self) -> Box<dyn ContentHasher> {
        (self.factory)()
    }
}

impl fmt::Debug for HashInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashInfo")
            .field("hash_type", &self.hash_type)
            .field("byte_length", &self.byte_length)
            .finish()
    }
}

fn new_sha1() -> Box<dyn ContentHasher> {
    Box::new(DigestHasher::<Sha1>::new(HashType::Sha1))
}

fn new_sha256() -> Box<dyn ContentHasher> {
    Box::new(DigestHasher::<Sha256>::new(HashType::Sha256))
}

fn new_md5() -> Box<dyn ContentHasher> {
    Box::new(DigestHasher::<Md5>::new(HashType::Md5))
}

fn new_vso0() -> Box<dyn ContentHasher> {
    Box::new(VsoHasher::new())
}

fn new_xxh3() -> Box<dyn ContentHasher> {
    Box::new(Xxh3Hasher::new())
}

fn new_dedup_single_chunk() -> Box<dyn ContentHasher> {
    Box::new(DedupHasher::with_params(
        HashType::DedupSingleChunk,
        DedupParams::SINGLE_CHUNK,
    ))
}

fn new_dedup_node() -> Box<dyn ContentHasher> {
    Box::new(DedupHasher::with_params(HashType::DedupNode, DedupParams::NODE_64K))
}

fn new_dedup_64k() -> Box<dyn ContentHasher> {
    Box::new(DedupHasher::with_params(
        HashType::Dedup64K,
        DedupParams::NODE_OR_CHUNK_64K,
    ))
}

fn new_dedup_1024k() -> Box<dyn ContentHasher> {
    Box::new(DedupHasher::with_params(
        HashType::Dedup1024K,
        DedupParams::NODE_OR_CHUNK_1024K,
    ))
}

/// SHA-1 descriptor.
pub static SHA1_INFO: HashInfo = HashInfo::new(HashType::Sha1, new_sha1);

/// SHA-256 descriptor.
pub static SHA256_INFO: HashInfo = HashInfo::new(HashType::Sha256, new_sha256);

/// MD5 descriptor.
pub static MD5_INFO: HashInfo = HashInfo::new(HashType::Md5, new_md5);

/// VSO0 descriptor, shared with [`HashType::DeprecatedVso0`].
pub static VSO0_INFO: HashInfo = HashInfo::new(HashType::Vso0, new_vso0);

/// Single dedup chunk descriptor.
pub static DEDUP_SINGLE_CHUNK_INFO: HashInfo =
    HashInfo::new(HashType::DedupSingleChunk, new_dedup_single_chunk);

/// 64 KiB always-node dedup descriptor.
pub static DEDUP_NODE_INFO: HashInfo = HashInfo::new(HashType::DedupNode, new_dedup_node);

/// 64 KiB node-or-chunk dedup descriptor.
pub static DEDUP_64K_INFO: HashInfo = HashInfo::new(HashType::Dedup64K, new_dedup_64k);

/// 1 MiB node-or-chunk dedup descriptor.
pub static DEDUP_1024K_INFO: HashInfo = HashInfo::new(HashType::Dedup1024K, new_dedup_1024k);

/// XXH3-128 descriptor.
pub static XXH3_INFO: HashInfo = HashInfo::new(HashType::Xxh3, new_xxh3);
