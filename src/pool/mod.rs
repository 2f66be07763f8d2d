//! Pooling of content hashers.
//!
//! Hasher state can be large (a dedup hasher carries a chunker and a
//! partially built tree), so hashers are recycled rather than rebuilt for
//! every stream.
//!
//! - [`ContentHasherPool`] - Idle hashers for one algorithm
//! - [`PooledHasher`] - RAII guard returning a hasher to its pool
//! - [`HasherPools`] - One pool per registered algorithm

mod hasher_pool;
mod set;

pub use hasher_pool::{ContentHasherPool, PoolStats, PooledHasher};
pub use set::HasherPools;
