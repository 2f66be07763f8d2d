//! Non-cryptographic fast hash.

use xxhash_rust::xxh3::Xxh3;

use super::{ContentHasher, Finalized, HashOutput};
use crate::content::ContentHash;
use crate::error::Result;
use crate::hash_type::HashType;

/// XXH3 with a 128-bit output, serialized big-endian.
///
/// Only suitable where collisions are not adversarial.
pub struct Xxh3Hasher {
    state: Xxh3,
    length: u64,
    finalized: Finalized,
}

impl Xxh3Hasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            state: Xxh3::new(),
            length: 0,
            finalized: Finalized::default(),
        }
    }
}

impl Default for Xxh3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Xxh3Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Xxh3Hasher")
            .field("length", &self.length)
            .field("finalized", &self.finalized)
            .finish()
    }
}

impl ContentHasher for Xxh3Hasher {
    fn hash_type(&self) -> HashType {
        HashType::Xxh3
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.finalized.check_open("update after finalize")?;
        self.state.update(data);
        self.length += data.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<HashOutput> {
        self.finalized.close()?;
        let digest = self.state.digest128().to_be_bytes();
        let hash = ContentHash::new(HashType::Xxh3, &digest)?;
        Ok(HashOutput::single_pass(hash, self.length))
    }

    fn reset(&mut self) {
        self.state.reset();
        self.length = 0;
        self.finalized.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let expected = xxhash_rust::xxh3::xxh3_128(data).to_be_bytes();

        let mut hasher = Xxh3Hasher::new();
        hasher.update(&data[..10]).unwrap();
        hasher.update(&data[10..]).unwrap();
        let output = hasher.finalize().unwrap();
        assert_eq!(output.hash.as_bytes(), &expected);
        assert_eq!(output.hash.len(), 16);
        assert_eq!(output.length, data.len() as u64);
    }

    #[test]
    fn test_reset() {
        let mut hasher = Xxh3Hasher::new();
        let first = hasher.hash_bytes(b"abc").unwrap();
        hasher.reset();
        assert_eq!(hasher.hash_bytes(b"abc").unwrap(), first);
        hasher.reset();
        assert_ne!(hasher.hash_bytes(b"abd").unwrap(), first);
    }
}
