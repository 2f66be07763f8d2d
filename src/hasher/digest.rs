//! Adapter for RustCrypto digests.

use digest::Digest;

use super::{ContentHasher, Finalized, HashOutput};
use crate::content::ContentHash;
use crate::error::Result;
use crate::hash_type::HashType;

/// A content hasher backed by any [`Digest`] implementation.
///
/// Serves SHA-1, SHA-256 and MD5; the output is the plain digest.
///
/// ```
/// use contenthash::{ContentHasher, DigestHasher, HashType};
///
/// let mut hasher = DigestHasher::<sha2::Sha256>::new(HashType::Sha256);
/// hasher.update(b"abc")?;
/// let output = hasher.finalize()?;
/// assert_eq!(
///     output.hash.to_hex(),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// # Ok::<(), contenthash::HashError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DigestHasher<D> {
    hash_type: HashType,
    state: D,
    length: u64,
    finalized: Finalized,
}

impl<D: Digest> DigestHasher<D> {
    /// Creates a hasher producing addresses tagged with `hash_type`.
    ///
    /// `hash_type`'s digest length must match `D`'s output size, otherwise
    /// `finalize` fails with [`HashError::InvalidContentHash`](crate::HashError).
    pub fn new(hash_type: HashType) -> Self {
        Self {
            hash_type: hash_type.canonical(),
            state: D::new(),
            length: 0,
            finalized: Finalized::default(),
        }
    }
}

impl<D: Digest + Send> ContentHasher for DigestHasher<D> {
    fn hash_type(&self) -> HashType {
        self.hash_type
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.finalized.check_open("update after finalize")?;
        Digest::update(&mut self.state, data);
        self.length += data.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<HashOutput> {
        self.finalized.close()?;
        let digest = std::mem::replace(&mut self.state, D::new()).finalize();
        let hash = ContentHash::new(self.hash_type, &digest)?;
        Ok(HashOutput::single_pass(hash, self.length))
    }

    fn reset(&mut self) {
        self.state = D::new();
        self.length = 0;
        self.finalized.reopen();
    }
}
