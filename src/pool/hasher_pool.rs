//! Per-algorithm pool of reusable content hashers.

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::config::IdleLimit;
use crate::content::ContentHash;
use crate::error::Result;
use crate::hash_type::{HashInfo, HashType};
use crate::hasher::{self, ContentHasher, HashOutput};

type SharedFactory = Arc<dyn Fn() -> Box<dyn ContentHasher> + Send + Sync>;

/// Counters describing how a pool has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Hashers constructed because none was idle.
    pub created: u64,

    /// Acquisitions served from an idle hasher.
    pub reused: u64,

    /// Hashers dropped instead of retained: past the idle bound, explicitly
    /// discarded, or abandoned after an error.
    pub discarded: u64,

    /// Hashers currently idle in the pool.
    pub idle: usize,
}

/// A thread-safe pool of content hashers for one algorithm.
///
/// Acquisition pops an idle hasher or constructs a new one; it never blocks
/// waiting for a release. Released hashers are reset and retained up to the
/// pool's [`IdleLimit`]. The lock is held only to move a hasher in or out of
/// the idle list, never while hashing.
///
/// # Example
///
/// ```
/// use contenthash::{ContentHasher, ContentHasherPool, IdleLimit, SHA1_INFO};
///
/// let pool = ContentHasherPool::new(&SHA1_INFO, IdleLimit::Bounded(4));
///
/// let mut hasher = pool.acquire();
/// let hash = hasher.hash_bytes(b"abc")?;
/// drop(hasher); // reset and returned to the pool
///
/// assert_eq!(hash.len(), 20);
/// assert_eq!(pool.idle_count(), 1);
/// # Ok::<(), contenthash::HashError>(())
/// ```
pub struct ContentHasherPool {
    hash_type: HashType,
    factory: SharedFactory,
    idle: Mutex<Vec<Box<dyn ContentHasher>>>,
    limit: IdleLimit,
    created: AtomicU64,
    reused: AtomicU64,
    discarded: AtomicU64,
}

impl ContentHasherPool {
    /// Creates a pool building hashers with the descriptor's factory.
    pub fn new(info: &'static HashInfo, limit: IdleLimit) -> Self {
        Self::with_factory(info.hash_type(), info.factory(), limit)
    }

    /// Creates a pool building hashers with a custom factory.
    ///
    /// Every hasher `factory` returns must produce `hash_type`.
    pub fn with_factory<F>(hash_type: HashType, factory: F, limit: IdleLimit) -> Self
    where
        F: Fn() -> Box<dyn ContentHasher> + Send + Sync + 'static,
    {
        Self {
            hash_type,
            factory: Arc::new(factory),
            idle: Mutex::new(Vec::new()),
            limit,
            created: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Returns the hash type this pool serves.
    pub fn hash_type(&self) -> HashType {
        self.hash_type
    }

    /// Returns the idle retention bound.
    pub fn idle_limit(&self) -> IdleLimit {
        self.limit
    }

    /// Takes an idle hasher, or constructs one if none is idle.
    ///
    /// The returned guard gives exclusive use of the hasher until it is
    /// dropped, released or discarded.
    pub fn acquire(&self) -> PooledHasher<'_> {
        let idle = self.idle.lock().pop();
        let hasher = match idle {
            Some(hasher) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                hasher
            }
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                trace!(hash_type = %self.hash_type, "constructing content hasher");
                (self.factory)()
            }
        };
        PooledHasher {
            pool: self,
            hasher: Some(hasher),
            poisoned: false,
        }
    }

    /// Returns the number of idle hashers.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Drops every idle hasher.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.idle.lock());
        trace!(hash_type = %self.hash_type, count = drained.len(), "cleared idle hashers");
    }

    /// Returns usage counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            idle: self.idle_count(),
        }
    }

    fn give_back(&self, mut hasher: Box<dyn ContentHasher>) {
        hasher.reset();
        let mut idle = self.idle.lock();
        if self.limit.admits(idle.len()) {
            idle.push(hasher);
            return;
        }
        drop(idle);
        self.discarded.fetch_add(1, Ordering::Relaxed);
        trace!(hash_type = %self.hash_type, "idle pool full, dropping released hasher");
    }

    fn abandon(&self, reason: &'static str) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        trace!(hash_type = %self.hash_type, reason, "dropping pooled hasher");
    }
}

impl fmt::Debug for ContentHasherPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentHasherPool")
            .field("hash_type", &self.hash_type)
            .field("limit", &self.limit)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Exclusive use of a pooled hasher.
///
/// Dropping the guard resets the hasher and returns it to its pool. A hasher
/// that reported an error, or is dropped during a panic, is discarded
/// instead, so only hashers in a known state are ever handed out again.
///
/// The guard is itself a [`ContentHasher`]; calls go through it so that
/// errors can be tracked.
pub struct PooledHasher<'a> {
    pool: &'a ContentHasherPool,
    hasher: Option<Box<dyn ContentHasher>>,
    poisoned: bool,
}

impl PooledHasher<'_> {
    /// Returns the hasher to the pool.
    pub fn release(self) {}

    /// Drops the hasher instead of returning it to the pool.
    pub fn discard(mut self) {
        if self.hasher.take().is_some() {
            self.pool.abandon("discarded by caller");
        }
    }

    /// Reads `reader` to the end and finalizes.
    pub fn hash_reader<R: Read>(&mut self, reader: R) -> Result<HashOutput> {
        hasher::hash_reader(self, reader)
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn inner(&self) -> &dyn ContentHasher {
        // Only drop and discard take the hasher, and both consume the guard.
        self.hasher.as_deref().unwrap_or_else(|| unreachable!())
    }

    fn inner_mut(&mut self) -> &mut dyn ContentHasher {
        self.hasher.as_deref_mut().unwrap_or_else(|| unreachable!())
    }
}

impl ContentHasher for PooledHasher<'_> {
    fn hash_type(&self) -> HashType {
        self.inner().hash_type()
    }

    fn byte_length(&self) -> usize {
        self.inner().byte_length()
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        let result = self.inner_mut().update(data);
        self.track(result)
    }

    fn finalize(&mut self) -> Result<HashOutput> {
        let result = self.inner_mut().finalize();
        self.track(result)
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
        self.poisoned = false;
    }

    fn hash_bytes(&mut self, data: &[u8]) -> Result<ContentHash> {
        self.update(data)?;
        Ok(self.finalize()?.hash)
    }
}

impl fmt::Debug for PooledHasher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledHasher")
            .field("hash_type", &self.pool.hash_type)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

impl Drop for PooledHasher<'_> {
    fn drop(&mut self) {
        let Some(hasher) = self.hasher.take() else {
            return;
        };
        if self.poisoned {
            self.pool.abandon("hasher reported an error");
        } else if std::thread::panicking() {
            self.pool.abandon("released during panic");
        } else {
            self.pool.give_back(hasher);
        }
    }
}
