//! Content-Defined Chunking (CDC) primitives.
//!
//! This module contains the rolling fingerprint used to identify chunk
//! boundaries based on content patterns rather than fixed offsets.
//!
//! - [`RollingHash`] - Buzhash over a fixed sliding window

mod buzhash;

pub use buzhash::{RollingHash, WINDOW_SIZE};
