//! Configuration for chunking and hasher pooling.
//!
//! - [`ChunkerConfig`] - Chunk size boundaries for content-defined chunking
//! - [`PoolConfig`] - Idle retention bound for pooled content hashers
//! - [`IdleLimit`] - The retention bound itself
//!
//! # Example
//!
//! ```
//! use contenthash::{ChunkerConfig, IdleLimit, PoolConfig};
//!
//! // Custom chunk sizes
//! let config = ChunkerConfig::new(4096, 16384, 65536)?;
//!
//! // Keep at most 8 idle hashers per algorithm
//! let pools = PoolConfig::default().with_idle_limit(IdleLimit::Bounded(8));
//!
//! # Ok::<(), contenthash::HashError>(())
//! ```

use crate::cdc::WINDOW_SIZE;
use crate::error::HashError;

/// Minimum chunk size used by the 64 KiB dedup variants.
pub const MIN_CHUNK_SIZE_64K: usize = 32 * 1024;

/// Target chunk size used by the 64 KiB dedup variants.
pub const AVG_CHUNK_SIZE_64K: usize = 64 * 1024;

/// Maximum chunk size used by the 64 KiB dedup variants.
pub const MAX_CHUNK_SIZE_64K: usize = 128 * 1024;

/// Minimum chunk size used by the 1024 KiB dedup variant.
pub const MIN_CHUNK_SIZE_1024K: usize = 512 * 1024;

/// Target chunk size used by the 1024 KiB dedup variant.
pub const AVG_CHUNK_SIZE_1024K: usize = 1024 * 1024;

/// Maximum chunk size used by the 1024 KiB dedup variant.
pub const MAX_CHUNK_SIZE_1024K: usize = 2 * 1024 * 1024;

/// Configuration for content-defined chunking.
///
/// Size constraints: `WINDOW_SIZE <= min_size <= avg_size <= max_size`, all
/// powers of 2.
///
/// The boundary predicate is tuned so that the expected chunk length is
/// `avg_size`: past `min_size` each position matches with probability
/// `1 / (avg_size - min_size)`, so the expected overshoot past the minimum
/// makes up the difference. When `min_size == avg_size` the probability is
/// `1 / avg_size`.
///
/// These values are part of the addressing scheme. Changing them for an
/// existing hash type changes every chunk boundary it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkerConfig {
    min_size: usize,
    avg_size: usize,
    max_size: usize,
}

impl ChunkerConfig {
    /// Chunk sizes for the 64 KiB dedup variants.
    pub const CHUNK_64K: ChunkerConfig = ChunkerConfig {
        min_size: MIN_CHUNK_SIZE_64K,
        avg_size: AVG_CHUNK_SIZE_64K,
        max_size: MAX_CHUNK_SIZE_64K,
    };

    /// Chunk sizes for the 1024 KiB dedup variant.
    pub const CHUNK_1024K: ChunkerConfig = ChunkerConfig {
        min_size: MIN_CHUNK_SIZE_1024K,
        avg_size: AVG_CHUNK_SIZE_1024K,
        max_size: MAX_CHUNK_SIZE_1024K,
    };

    /// Creates a new configuration.
    ///
    /// Returns error if sizes are zero, not powers of 2, out of order, or if
    /// `min_size` is smaller than the rolling window.
    pub fn new(min_size: usize, avg_size: usize, max_size: usize) -> Result<Self, HashError> {
        if min_size == 0 || avg_size == 0 || max_size == 0 {
            return Err(HashError::InvalidConfig {
                message: "chunk sizes must be non-zero",
            });
        }

        if min_size > avg_size {
            return Err(HashError::InvalidConfig {
                message: "min_size cannot be greater than avg_size",
            });
        }

        if avg_size > max_size {
            return Err(HashError::InvalidConfig {
                message: "avg_size cannot be greater than max_size",
            });
        }

        if !min_size.is_power_of_two() || !avg_size.is_power_of_two() || !max_size.is_power_of_two()
        {
            return Err(HashError::InvalidConfig {
                message: "chunk sizes should be powers of 2",
            });
        }

        if min_size < WINDOW_SIZE {
            return Err(HashError::InvalidConfig {
                message: "min_size cannot be smaller than the rolling window",
            });
        }

        Ok(Self {
            min_size,
            avg_size,
            max_size,
        })
    }

    /// Returns the minimum chunk size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the target chunk size.
    pub fn avg_size(&self) -> usize {
        self.avg_size
    }

    /// Returns the maximum chunk size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Expected distance from `min_size` to the next boundary.
    pub fn boundary_spread(&self) -> usize {
        match self.avg_size - self.min_size {
            0 => self.avg_size,
            spread => spread,
        }
    }

    /// Largest fingerprint that declares a boundary.
    ///
    /// A uniformly distributed fingerprint is at or below this value with
    /// probability `1 / boundary_spread()`.
    pub fn boundary_threshold(&self) -> u64 {
        u64::MAX / self.boundary_spread() as u64
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), HashError> {
        Self::new(self.min_size, self.avg_size, self.max_size).map(|_| ())
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self::CHUNK_64K
    }
}

/// Maximum number of idle hashers a pool keeps for future use.
///
/// This bounds memory, not throughput: acquisition never waits for a free
/// slot, it constructs a new hasher when none is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "i64"))]
pub enum IdleLimit {
    /// Every released hasher is retained.
    #[default]
    Unbounded,
    /// At most this many idle hashers are retained; excess releases are dropped.
    Bounded(usize),
}

impl IdleLimit {
    /// Parses the raw configuration value: `-1` is unbounded, `N >= 0` bounded.
    pub fn from_raw(raw: i64) -> Result<Self, HashError> {
        match raw {
            -1 => Ok(IdleLimit::Unbounded),
            n if n >= 0 => usize::try_from(n)
                .map(IdleLimit::Bounded)
                .map_err(|_| HashError::InvalidConfig {
                    message: "idle pool size does not fit in usize",
                }),
            _ => Err(HashError::InvalidConfig {
                message: "idle pool size must be -1 (unbounded) or non-negative",
            }),
        }
    }

    /// Returns the raw configuration value.
    pub fn to_raw(self) -> i64 {
        match self {
            IdleLimit::Unbounded => -1,
            IdleLimit::Bounded(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }

    /// Returns true if `idle` more retained hashers would still be within bounds.
    pub fn admits(self, idle: usize) -> bool {
        match self {
            IdleLimit::Unbounded => true,
            IdleLimit::Bounded(n) => idle < n,
        }
    }
}

impl TryFrom<i64> for IdleLimit {
    type Error = HashError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<IdleLimit> for i64 {
    fn from(limit: IdleLimit) -> Self {
        limit.to_raw()
    }
}

/// Configuration for content hasher pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Idle retention bound applied to every per-algorithm pool.
    pub idle_limit: IdleLimit,
}

impl PoolConfig {
    /// Creates a configuration from the raw idle pool size (`-1` for unbounded).
    pub fn from_raw(idle_pool_size: i64) -> Result<Self, HashError> {
        Ok(Self {
            idle_limit: IdleLimit::from_raw(idle_pool_size)?,
        })
    }

    /// Sets the idle retention bound.
    pub fn with_idle_limit(mut self, limit: IdleLimit) -> Self {
        self.idle_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunker_config_default() {
        let config = ChunkerConfig::default();
        assert_eq!(config.min_size(), 32 * 1024);
        assert_eq!(config.avg_size(), 64 * 1024);
        assert_eq!(config.max_size(), 128 * 1024);
        assert_eq!(config.boundary_spread(), 32 * 1024);
        assert_eq!(config.boundary_threshold(), u64::MAX >> 15);
    }

    #[test]
    fn test_chunker_config_1024k() {
        let config = ChunkerConfig::CHUNK_1024K;
        assert!(config.validate().is_ok());
        assert_eq!(config.boundary_threshold(), u64::MAX >> 19);
    }

    #[test]
    fn test_chunker_config_valid() {
        let config = ChunkerConfig::new(64, 256, 1024).unwrap();
        assert_eq!(config.min_size(), 64);
        assert_eq!(config.avg_size(), 256);
        assert_eq!(config.max_size(), 1024);
        assert_eq!(config.boundary_spread(), 192);
        assert_eq!(config.boundary_threshold(), u64::MAX / 192);
    }

    #[test]
    fn test_chunker_config_spread_when_min_equals_avg() {
        let config = ChunkerConfig::new(256, 256, 1024).unwrap();
        assert_eq!(config.boundary_spread(), 256);
        assert_eq!(config.boundary_threshold(), u64::MAX >> 8);
    }

    #[test]
    fn test_chunker_config_spread_not_a_power_of_two() {
        let config = ChunkerConfig::new(256 * 1024, 1024 * 1024, 4 * 1024 * 1024).unwrap();
        assert_eq!(config.boundary_spread(), 768 * 1024);
        assert_eq!(config.min_size() + config.boundary_spread(), config.avg_size());
    }

    #[test]
    fn test_chunker_config_invalid_zero() {
        assert!(ChunkerConfig::new(0, 16384, 65536).is_err());
        assert!(ChunkerConfig::new(4096, 0, 65536).is_err());
        assert!(ChunkerConfig::new(4096, 16384, 0).is_err());
    }

    #[test]
    fn test_chunker_config_invalid_ordering() {
        assert!(ChunkerConfig::new(32768, 16384, 65536).is_err());
        assert!(ChunkerConfig::new(4096, 65536, 16384).is_err());
    }

    #[test]
    fn test_chunker_config_invalid_non_power_of_two() {
        assert!(ChunkerConfig::new(100, 256, 1024).is_err());
        assert!(ChunkerConfig::new(64, 257, 1024).is_err());
        assert!(ChunkerConfig::new(64, 256, 1025).is_err());
    }

    #[test]
    fn test_chunker_config_min_below_window() {
        assert!(ChunkerConfig::new(32, 256, 1024).is_err());
    }

    #[test]
    fn test_idle_limit_from_raw() {
        assert_eq!(IdleLimit::from_raw(-1).unwrap(), IdleLimit::Unbounded);
        assert_eq!(IdleLimit::from_raw(0).unwrap(), IdleLimit::Bounded(0));
        assert_eq!(IdleLimit::from_raw(16).unwrap(), IdleLimit::Bounded(16));
        assert!(IdleLimit::from_raw(-2).is_err());
    }

    #[test]
    fn test_idle_limit_admits() {
        assert!(IdleLimit::Unbounded.admits(usize::MAX - 1));
        assert!(IdleLimit::Bounded(2).admits(1));
        assert!(!IdleLimit::Bounded(2).admits(2));
        assert!(!IdleLimit::Bounded(0).admits(0));
    }

    #[test]
    fn test_pool_config_default_is_unbounded() {
        assert_eq!(PoolConfig::default().idle_limit, IdleLimit::Unbounded);
        assert_eq!(PoolConfig::default().idle_limit.to_raw(), -1);
    }

    #[test]
    fn test_pool_config_from_raw() {
        let config = PoolConfig::from_raw(4).unwrap();
        assert_eq!(config.idle_limit, IdleLimit::Bounded(4));
        assert!(PoolConfig::from_raw(-7).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_pool_config_deserialize() {
        let config: PoolConfig = serde_json::from_str(r#"{"idle_limit": 3}"#).unwrap();
        assert_eq!(config.idle_limit, IdleLimit::Bounded(3));

        let config: PoolConfig = serde_json::from_str(r#"{"idle_limit": -1}"#).unwrap();
        assert_eq!(config.idle_limit, IdleLimit::Unbounded);

        let config: PoolConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.idle_limit, IdleLimit::Unbounded);

        assert!(serde_json::from_str::<PoolConfig>(r#"{"idle_limit": -5}"#).is_err());
    }
}
