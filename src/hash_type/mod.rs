//! Hash type identifiers, algorithm descriptors and the registry.
//!
//! - [`HashType`] - Closed set of stable hash type identifiers
//! - [`HashInfo`] - Immutable metadata and hasher factory for one algorithm
//! - [`HashRegistry`] - Lookup from identifier to descriptor

mod info;
mod registry;

use std::fmt;
use std::str::FromStr;

use crate::error::HashError;

pub use info::{
    DEDUP_1024K_INFO, DEDUP_64K_INFO, DEDUP_NODE_INFO, DEDUP_SINGLE_CHUNK_INFO, HasherFactory,
    HashInfo, MD5_INFO, SHA1_INFO, SHA256_INFO, VSO0_INFO, XXH3_INFO,
};
pub use registry::HashRegistry;

/// Stable identifier of a content hashing algorithm.
///
/// The numeric value is written in front of every persisted content hash and
/// must never change for an existing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum HashType {
    /// SHA-1, 20 bytes.
    Sha1 = 1,
    /// SHA-256, 32 bytes.
    Sha256 = 2,
    /// MD5, 16 bytes.
    Md5 = 3,
    /// Paged and blocked SHA-256 blob identifier, 33 bytes.
    Vso0 = 4,
    /// Whole content hashed as a single dedup chunk, 33 bytes.
    DedupSingleChunk = 5,
    /// 64 KiB content-defined chunk tree whose root is always a node, 33 bytes.
    DedupNode = 6,
    /// 64 KiB content-defined chunk tree, node or chunk root, 33 bytes.
    Dedup64K = 7,
    /// 1 MiB content-defined chunk tree, node or chunk root, 33 bytes.
    Dedup1024K = 8,
    /// Non-cryptographic XXH3-128, 16 bytes.
    Xxh3 = 9,
    /// Deprecated identifier of [`HashType::Vso0`], kept so previously
    /// stored addresses still resolve.
    DeprecatedVso0 = 127,
}

impl HashType {
    /// Every identifier, aliases included.
    pub const ALL: [HashType; 10] = [
        HashType::Sha1,
        HashType::Sha256,
        HashType::Md5,
        HashType::Vso0,
        HashType::DedupSingleChunk,
        HashType::DedupNode,
        HashType::Dedup64K,
        HashType::Dedup1024K,
        HashType::Xxh3,
        HashType::DeprecatedVso0,
    ];

    /// Returns the persisted identifier byte.
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns the display token used in textual content hashes.
    pub const fn name(self) -> &'static str {
        match self {
            HashType::Sha1 => "SHA1",
            HashType::Sha256 => "SHA256",
            HashType::Md5 => "MD5",
            HashType::Vso0 => "VSO0",
            HashType::DedupSingleChunk => "DEDUPCHUNK",
            HashType::DedupNode => "DEDUPNODE",
            HashType::Dedup64K => "DEDUP64K",
            HashType::Dedup1024K => "DEDUP1024K",
            HashType::Xxh3 => "XXH3",
            HashType::DeprecatedVso0 => "DEPRECATEDVSO0",
        }
    }

    /// Returns the digest length in bytes.
    pub const fn byte_length(self) -> usize {
        match self {
            HashType::Sha1 => 20,
            HashType::Sha256 => 32,
            HashType::Md5 => 16,
            HashType::Xxh3 => 16,
            HashType::Vso0
            | HashType::DeprecatedVso0
            | HashType::DedupSingleChunk
            | HashType::DedupNode
            | HashType::Dedup64K
            | HashType::Dedup1024K => 33,
        }
    }

    /// Returns the identifier this one is an alias of, or itself.
    pub const fn canonical(self) -> HashType {
        match self {
            HashType::DeprecatedVso0 => HashType::Vso0,
            other => other,
        }
    }

    /// Returns true for deprecated alias identifiers.
    pub const fn is_alias(self) -> bool {
        self.canonical() as u8 != self as u8
    }

    /// Returns true for the chunk-tree algorithms.
    pub const fn is_dedup(self) -> bool {
        matches!(
            self,
            HashType::DedupSingleChunk
                | HashType::DedupNode
                | HashType::Dedup64K
                | HashType::Dedup1024K
        )
    }
}

impl TryFrom<u8> for HashType {
    type Error = HashError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        HashType::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| HashError::UnknownHashType(format!("id {}", id)))
    }
}

impl FromStr for HashType {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| HashError::UnknownHashType(s.to_string()))
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
