//! Content addresses and chunk records.
//!
//! - [`ContentHash`] - Hash type plus digest, the unit the cache stores by
//! - [`ChunkHash`] - 32-byte BLAKE3 digest of one chunk
//! - [`Chunk`] - Offset, length and hash of a content-defined chunk
//! - [`ChunkData`] - A chunk record together with its bytes

mod chunk;
mod hash;

pub use chunk::{Chunk, ChunkData, ChunkHash};
pub use hash::{ContentHash, MAX_HASH_LENGTH};

const HEX: &[u8; 16] = b"0123456789abcdef";

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        result.push(HEX[(byte >> 4) as usize] as char);
        result.push(HEX[(byte & 0xf) as usize] as char);
    }
    result
}

/// Only the lowercase form written by [`to_hex`] is accepted.
pub(crate) fn from_hex(hex: &str, out: &mut [u8]) -> Option<()> {
    let hex = hex.as_bytes();
    if hex.len() != out.len() * 2 {
        return None;
    }
    for (slot, pair) in out.iter_mut().zip(hex.chunks_exact(2)) {
        *slot = (nibble(pair[0])? << 4) | nibble(pair[1])?;
    }
    Some(())
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}
