//! The content address type.

use std::fmt;
use std::str::FromStr;

use crate::error::HashError;
use crate::hash_type::HashType;

/// Longest digest any registered algorithm produces.
pub const MAX_HASH_LENGTH: usize = 33;

/// A content address: hash type plus exactly `hash_type.byte_length()` digest bytes.
///
/// Equality, ordering and hashing cover both fields. Identical bytes under
/// the same hash type always produce the same address, across processes and
/// platforms.
///
/// The persisted layout is the identifier byte followed by the digest with no
/// padding:
///
/// ```
/// use contenthash::{ContentHash, HashType};
///
/// let hash = ContentHash::new(HashType::Md5, &[0xAB; 16])?;
/// let bytes = hash.to_bytes();
/// assert_eq!(bytes.len(), 17);
/// assert_eq!(bytes[0], HashType::Md5.id());
/// assert_eq!(ContentHash::from_bytes(&bytes)?, hash);
/// # Ok::<(), contenthash::HashError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash {
    hash_type: HashType,
    // Bytes past the digest length stay zero.
    digest: [u8; MAX_HASH_LENGTH],
}

impl ContentHash {
    /// Creates a content hash, checking the digest length against the hash type.
    pub fn new(hash_type: HashType, digest: &[u8]) -> Result<Self, HashError> {
        let hash_type = hash_type.canonical();
        if digest.len() != hash_type.byte_length() {
            return Err(HashError::InvalidContentHash(format!(
                "{} digest must be {} bytes, got {}",
                hash_type,
                hash_type.byte_length(),
                digest.len()
            )));
        }
        let mut buf = [0u8; MAX_HASH_LENGTH];
        buf[..digest.len()].copy_from_slice(digest);
        Ok(Self {
            hash_type,
            digest: buf,
        })
    }

    /// Parses the persisted layout: identifier byte then digest.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        let (&id, digest) = bytes
            .split_first()
            .ok_or_else(|| HashError::InvalidContentHash("empty input".to_string()))?;
        Self::new(HashType::try_from(id)?, digest)
    }

    /// Returns the hash type.
    pub fn hash_type(&self) -> HashType {
        self.hash_type
    }

    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.digest[..self.hash_type.byte_length()]
    }

    /// Returns the digest length in bytes.
    pub fn len(&self) -> usize {
        self.hash_type.byte_length()
    }

    /// Always false: every registered algorithm has a non-empty digest.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Serializes to the persisted layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.len());
        out.push(self.hash_type.id());
        out.extend_from_slice(self.as_bytes());
        out
    }

    /// Returns the digest as lowercase hex.
    pub fn to_hex(&self) -> String {
        super::to_hex(self.as_bytes())
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash_type, self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self)
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    /// Parses `TOKEN:hex`, e.g. `SHA1:da39a3ee5e6b4b0d3255bfef95601890afd80709`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (token, hex) = s
            .split_once(':')
            .ok_or_else(|| HashError::InvalidContentHash(format!("missing ':' in {:?}", s)))?;
        let hash_type: HashType = token.parse()?;
        let mut digest = [0u8; MAX_HASH_LENGTH];
        let digest = &mut digest[..hash_type.byte_length()];
        super::from_hex(hex, digest)
            .ok_or_else(|| HashError::InvalidContentHash(format!("bad digest in {:?}", s)))?;
        Self::new(hash_type, digest)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
