//! One pool per registered algorithm.

use std::collections::HashMap;
use std::io::Read;

use tracing::debug;

use super::{ContentHasherPool, PoolStats, PooledHasher};
use crate::config::PoolConfig;
use crate::content::ContentHash;
use crate::error::{HashError, Result};
use crate::hash_type::{HashRegistry, HashType};
use crate::hasher::{ContentHasher, HashOutput};

/// Content hasher pools for every algorithm of a registry.
///
/// Aliases share the pool of their canonical algorithm.
///
/// # Example
///
/// ```
/// use contenthash::{HashRegistry, HashType, HasherPools, PoolConfig};
///
/// let pools = HasherPools::new(&HashRegistry::new(), PoolConfig::default());
///
/// let a = pools.hash_bytes(HashType::Vso0, b"payload")?;
/// let b = pools.hash_bytes(HashType::DeprecatedVso0, b"payload")?;
/// assert_eq!(a, b);
/// # Ok::<(), contenthash::HashError>(())
/// ```
#[derive(Debug)]
pub struct HasherPools {
    config: PoolConfig,
    pools: Vec<ContentHasherPool>,
    by_type: HashMap<HashType, usize>,
}

impl HasherPools {
    /// Creates one pool per distinct descriptor in `registry`.
    pub fn new(registry: &HashRegistry, config: PoolConfig) -> Self {
        let mut pools = Vec::new();
        let mut by_canonical = HashMap::new();
        for info in registry.all() {
            by_canonical.insert(info.hash_type(), pools.len());
            pools.push(ContentHasherPool::new(info, config.idle_limit));
        }

        let by_type = registry
            .hash_types()
            .filter_map(|t| {
                let info = registry.find(t).ok()?;
                by_canonical.get(&info.hash_type()).map(|&i| (t, i))
            })
            .collect();

        debug!(
            pools = pools.len(),
            idle_limit = ?config.idle_limit,
            "created content hasher pools"
        );
        Self {
            config,
            pools,
            by_type,
        }
    }

    /// Returns the configuration the pools were created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the pool serving `hash_type`.
    pub fn pool(&self, hash_type: HashType) -> Result<&ContentHasherPool> {
        self.by_type
            .get(&hash_type)
            .map(|&i| &self.pools[i])
            .ok_or_else(|| HashError::UnknownHashType(format!("no pool for {}", hash_type)))
    }

    /// Acquires a hasher for `hash_type`.
    pub fn acquire(&self, hash_type: HashType) -> Result<PooledHasher<'_>> {
        Ok(self.pool(hash_type)?.acquire())
    }

    /// Hashes an in-memory buffer with a pooled hasher.
    pub fn hash_bytes(&self, hash_type: HashType, data: &[u8]) -> Result<ContentHash> {
        self.acquire(hash_type)?.hash_bytes(data)
    }

    /// Hashes a reader to the end with a pooled hasher.
    pub fn hash_reader<R: Read>(&self, hash_type: HashType, reader: R) -> Result<HashOutput> {
        self.acquire(hash_type)?.hash_reader(reader)
    }

    /// Constructs `count` hashers per algorithm up front and parks them idle.
    ///
    /// Parking is still subject to the idle bound.
    pub fn warm(&self, count: usize) {
        for pool in &self.pools {
            let held: Vec<_> = (0..count).map(|_| pool.acquire()).collect();
            drop(held);
        }
        debug!(count, "warmed content hasher pools");
    }

    /// Returns usage counters per canonical algorithm.
    pub fn stats(&self) -> Vec<(HashType, PoolStats)> {
        self.pools
            .iter()
            .map(|pool| (pool.hash_type(), pool.stats()))
            .collect()
    }
}

impl Default for HasherPools {
    fn default() -> Self {
        Self::new(&HashRegistry::new(), PoolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdleLimit;
    use std::io::Cursor;

    #[test]
    fn test_every_type_has_a_pool() {
        let pools = HasherPools::default();
        for t in HashType::ALL {
            let pool = pools.pool(t).unwrap();
            assert_eq!(pool.hash_type(), t.canonical());
        }
        assert_eq!(pools.stats().len(), HashType::ALL.len() - 1);
    }

    #[test]
    fn test_alias_shares_pool() {
        let pools = HasherPools::default();
        let a = pools.pool(HashType::Vso0).unwrap();
        let b = pools.pool(HashType::DeprecatedVso0).unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_unregistered_type() {
        let mut registry = HashRegistry::empty();
        registry.register(&crate::hash_type::SHA1_INFO);
        let pools = HasherPools::new(&registry, PoolConfig::default());
        assert!(pools.acquire(HashType::Sha1).is_ok());
        assert!(matches!(
            pools.acquire(HashType::Md5),
            Err(HashError::UnknownHashType(_))
        ));
    }

    #[test]
    fn test_hash_reader_matches_hash_bytes() {
        let pools = HasherPools::default();
        let data = vec![0x5Au8; 200_000];
        for t in HashType::ALL {
            let from_reader = pools.hash_reader(t, Cursor::new(&data)).unwrap();
            assert_eq!(from_reader.hash, pools.hash_bytes(t, &data).unwrap(), "{}", t);
            assert_eq!(from_reader.length, data.len() as u64);
        }
    }

    #[test]
    fn test_warm() {
        let config = PoolConfig::default().with_idle_limit(IdleLimit::Bounded(2));
        let pools = HasherPools::new(&HashRegistry::new(), config);
        pools.warm(3);
        for (_, stats) in pools.stats() {
            assert_eq!(stats.created, 3);
            assert_eq!(stats.idle, 2);
        }
    }
}
