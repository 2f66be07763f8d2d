//! Thread-local read buffers.
//!
//! Readers are drained through fixed-size scratch buffers that return to a
//! per-thread pool on drop, so repeated hashing of readers on the same
//! thread does not allocate. Not part of the public API.

mod pool;

pub(crate) use pool::ReadBuffer;
