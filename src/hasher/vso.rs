//! Paged and blocked SHA-256 blob identifier.
//!
//! Content is split into 64 KiB pages, each hashed with SHA-256. Every 32
//! page hashes form a 2 MiB block whose hash is the SHA-256 of the
//! concatenated page hashes. The blob identifier is rolled block by block:
//!
//! ```text
//! id_0     = SHA256("VSO Content Identifier Seed")
//! id_{n+1} = SHA256(id_n || block_hash_n || is_final)
//! ```
//!
//! where `is_final` is a single byte, 1 for the last block and 0 otherwise.
//! Empty content is one empty final block. The digest is the final id
//! followed by the algorithm byte `0x00`.

use sha2::{Digest, Sha256};

use super::{ContentHasher, Finalized, HashOutput};
use crate::content::ContentHash;
use crate::error::Result;
use crate::hash_type::HashType;

/// Bytes per page.
pub const PAGE_SIZE: usize = 64 * 1024;

/// Pages per block.
pub const PAGES_PER_BLOCK: usize = 32;

/// Bytes per block.
pub const BLOCK_SIZE: usize = PAGE_SIZE * PAGES_PER_BLOCK;

const SEED: &[u8] = b"VSO Content Identifier Seed";

const ALGORITHM_ID: u8 = 0x00;

type Sha256Bytes = [u8; 32];

/// Streaming hasher for the block-rolled blob identifier.
#[derive(Debug, Clone)]
pub struct VsoHasher {
    page: Sha256,
    page_len: usize,
    block: Sha256,
    block_pages: usize,
    // A full block whose finality is not known until more data arrives.
    pending_block: Option<Sha256Bytes>,
    blob_id: Sha256Bytes,
    length: u64,
    finalized: Finalized,
}

impl VsoHasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            page: Sha256::new(),
            page_len: 0,
            block: Sha256::new(),
            block_pages: 0,
            pending_block: None,
            blob_id: Self::seed(),
            length: 0,
            finalized: Finalized::default(),
        }
    }

    fn seed() -> Sha256Bytes {
        Sha256::digest(SEED).into()
    }

    fn close_page(&mut self) {
        let page_hash = self.page.finalize_reset();
        self.block.update(page_hash);
        self.block_pages += 1;
        self.page_len = 0;
    }

    fn close_block(&mut self) -> Sha256Bytes {
        self.block_pages = 0;
        self.block.finalize_reset().into()
    }

    fn roll(&mut self, block_hash: &Sha256Bytes, is_final: bool) {
        let mut id = Sha256::new();
        id.update(self.blob_id);
        id.update(block_hash);
        id.update([is_final as u8]);
        self.blob_id = id.finalize().into();
    }
}

impl Default for VsoHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher for VsoHasher {
    fn hash_type(&self) -> HashType {
        HashType::Vso0
    }

    fn update(&mut self, mut data: &[u8]) -> Result<()> {
        self.finalized.check_open("update after finalize")?;
        self.length += data.len() as u64;

        while !data.is_empty() {
            if let Some(block_hash) = self.pending_block.take() {
                self.roll(&block_hash, false);
            }

            let take = (PAGE_SIZE - self.page_len).min(data.len());
            self.page.update(&data[..take]);
            self.page_len += take;
            data = &data[take..];

            if self.page_len == PAGE_SIZE {
                self.close_page();
                if self.block_pages == PAGES_PER_BLOCK {
                    self.pending_block = Some(self.close_block());
                }
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<HashOutput> {
        self.finalized.close()?;

        if self.page_len > 0 {
            self.close_page();
        }
        let last_block = match self.pending_block.take() {
            Some(block_hash) => block_hash,
            // Also covers empty content: SHA-256 of zero page hashes.
            None => self.close_block(),
        };
        self.roll(&last_block, true);

        let mut digest = [0u8; 33];
        digest[..32].copy_from_slice(&self.blob_id);
        digest[32] = ALGORITHM_ID;
        let hash = ContentHash::new(HashType::Vso0, &digest)?;
        Ok(HashOutput::single_pass(hash, self.length))
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
