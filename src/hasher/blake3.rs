//! BLAKE3 primitive for chunk and node hashes.

use crate::content::ChunkHash;

/// An incremental BLAKE3 hasher producing [`ChunkHash`] values.
#[derive(Debug, Clone)]
pub struct Blake3Hasher {
    state: blake3::Hasher,
}

impl Blake3Hasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            state: blake3::Hasher::new(),
        }
    }

    /// Updates the hasher with more data.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Returns the hash of everything fed so far.
    pub fn finalize(&self) -> ChunkHash {
        self.state.finalize().into()
    }

    /// Returns the hash and resets for the next chunk.
    pub fn finalize_reset(&mut self) -> ChunkHash {
        let hash = self.finalize();
        self.state.reset();
        hash
    }

    /// Resets the hasher to its initial state.
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_hashing() {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize(), ChunkHash::of(b"hello world"));
    }

    #[test]
    fn test_finalize_reset() {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"first");
        assert_eq!(hasher.finalize_reset(), ChunkHash::of(b"first"));

        hasher.update(b"second");
        assert_eq!(hasher.finalize_reset(), ChunkHash::of(b"second"));
        assert_eq!(hasher.finalize(), ChunkHash::of(b""));
    }

    #[test]
    fn test_reset() {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"some data");
        hasher.reset();
        hasher.update(b"hello world");
        assert_eq!(hasher.finalize(), ChunkHash::of(b"hello world"));
    }
}
