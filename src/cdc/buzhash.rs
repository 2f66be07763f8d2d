//! Buzhash rolling fingerprint.
//!
//! Buzhash (a cyclic polynomial hash) keeps a fingerprint of the last
//! [`WINDOW_SIZE`] bytes. Each step rotates the fingerprint by one bit, mixes
//! in the table entry for the incoming byte, and cancels the entry of the
//! byte leaving the window, which by then has been rotated `WINDOW_SIZE`
//! times:
//!
//! ```text
//! h' = rotl(h, 1) ^ T[in] ^ rotl(T[out], WINDOW_SIZE)
//! ```
//!
//! Every update is O(1) regardless of window size, and the fingerprint is a
//! function of the window contents only, never of the absolute position.
//!
//! The table and window size are part of the chunk addressing scheme. They
//! must not change for an existing hash type.

/// Number of bytes covered by the rolling fingerprint.
pub const WINDOW_SIZE: usize = 48;

/// Seed for the SplitMix64 generator that fills [`TABLE`].
const TABLE_SEED: u64 = 0x6275_7a68_6173_6821;

/// SplitMix64, evaluated at compile time to fill the byte table.
const fn buzhash_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut state = TABLE_SEED;
    let mut i = 0;
    while i < 256 {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        table[i] = z ^ (z >> 31);
        i += 1;
    }
    table
}

/// Per-byte random values mixed into the fingerprint.
static TABLE: [u64; 256] = buzhash_table();

/// Rotation applied to the outgoing byte's entry.
const OUT_ROTATION: u32 = (WINDOW_SIZE % 64) as u32;

/// Buzhash state over a [`WINDOW_SIZE`]-byte sliding window.
///
/// Until the window has filled, bytes are only added; afterwards each update
/// also removes the oldest byte, so the fingerprint always equals the buzhash
/// of the most recent `min(n, WINDOW_SIZE)` bytes.
#[derive(Debug, Clone)]
pub struct RollingHash {
    hash: u64,
    window: [u8; WINDOW_SIZE],
    pos: usize,
    filled: usize,
}

impl RollingHash {
    /// Creates an empty fingerprint.
    pub fn new() -> Self {
        Self {
            hash: 0,
            window: [0u8; WINDOW_SIZE],
            pos: 0,
            filled: 0,
        }
    }

    /// Clears the window for a new chunk.
    pub fn reset(&mut self) {
        self.hash = 0;
        self.pos = 0;
        self.filled = 0;
    }

    /// Slides one byte into the window and returns the new fingerprint.
    #[inline]
    pub fn roll(&mut self, byte: u8) -> u64 {
        let outgoing = self.window[self.pos];
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) % WINDOW_SIZE;

        self.hash = self.hash.rotate_left(1) ^ TABLE[byte as usize];
        if self.filled == WINDOW_SIZE {
            self.hash ^= TABLE[outgoing as usize].rotate_left(OUT_ROTATION);
        } else {
            self.filled += 1;
        }
        self.hash
    }

    /// Returns the current fingerprint.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Returns true once the window holds `WINDOW_SIZE` bytes.
    pub fn is_full(&self) -> bool {
        self.filled == WINDOW_SIZE
    }

    /// Computes the fingerprint of `window` from scratch.
    ///
    /// Only the last `WINDOW_SIZE` bytes contribute.
    pub fn fingerprint(window: &[u8]) -> u64 {
        let start = window.len().saturating_sub(WINDOW_SIZE);
        window[start..]
            .iter()
            .fold(0u64, |h, &b| h.rotate_left(1) ^ TABLE[b as usize])
    }
}

impl Default for RollingHash {
    fn default() -> Self {
        Self::new()
    }
}
