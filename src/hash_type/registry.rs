//! Registry mapping hash type identifiers to their descriptors.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use super::HashType;
use super::info::{
    DEDUP_1024K_INFO, DEDUP_64K_INFO, DEDUP_NODE_INFO, DEDUP_SINGLE_CHUNK_INFO, HashInfo, MD5_INFO,
    SHA1_INFO, SHA256_INFO, VSO0_INFO, XXH3_INFO,
};
use crate::error::HashError;
use crate::hasher::ContentHasher;

/// Lookup from [`HashType`] to [`HashInfo`].
///
/// A registry is built once, while it is still exclusively owned, and then
/// shared read-only (by reference or behind an `Arc`). Lookups need no
/// synchronization.
///
/// # Example
///
/// ```
/// use contenthash::{HashRegistry, HashType};
///
/// let registry = HashRegistry::new();
/// let info = registry.find(HashType::Sha256)?;
/// assert_eq!(info.byte_length(), 32);
///
/// // The deprecated alias resolves to the canonical descriptor.
/// let alias = registry.find(HashType::DeprecatedVso0)?;
/// assert_eq!(alias.hash_type(), HashType::Vso0);
/// # Ok::<(), contenthash::HashError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HashRegistry {
    by_type: HashMap<HashType, &'static HashInfo>,
    // Distinct descriptors in registration order.
    infos: Vec<&'static HashInfo>,
}

impl HashRegistry {
    /// Creates a registry holding every builtin algorithm and alias.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for info in [
            &SHA1_INFO,
            &SHA256_INFO,
            &MD5_INFO,
            &VSO0_INFO,
            &DEDUP_SINGLE_CHUNK_INFO,
            &DEDUP_NODE_INFO,
            &DEDUP_64K_INFO,
            &DEDUP_1024K_INFO,
            &XXH3_INFO,
        ] {
            registry.register(info);
        }
        registry
            .register_alias(HashType::DeprecatedVso0, HashType::Vso0)
            .unwrap_or_else(|err| unreachable!("builtin alias target missing: {err}"));
        registry
    }

    /// Creates a registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
            infos: Vec::new(),
        }
    }

    /// Registers a descriptor under its own hash type.
    ///
    /// A hash type that is already registered, directly or as an alias,
    /// keeps its descriptor. Registering the same descriptor twice is a no-op.
    pub fn register(&mut self, info: &'static HashInfo) -> &mut Self {
        if let Entry::Vacant(slot) = self.by_type.entry(info.hash_type()) {
            slot.insert(info);
            self.infos.push(info);
        }
        self
    }

    /// Registers `alias` as another identifier for `canonical`'s descriptor.
    ///
    /// Fails with [`HashError::UnknownHashType`] if `canonical` is not
    /// registered, and with [`HashError::InvalidConfig`] if `alias` already is.
    pub fn register_alias(
        &mut self,
        alias: HashType,
        canonical: HashType,
    ) -> Result<&mut Self, HashError> {
        let info = self.find(canonical)?;
        if self.by_type.contains_key(&alias) {
            return Err(HashError::InvalidConfig {
                message: "alias identifier is already registered",
            });
        }
        debug!(%alias, %canonical, "registering hash type alias");
        self.by_type.insert(alias, info);
        Ok(self)
    }

    /// Returns the descriptor for `hash_type`.
    ///
    /// The identifier set is closed; a failure here means the registry was
    /// built without a type its caller relies on.
    pub fn find(&self, hash_type: HashType) -> Result<&'static HashInfo, HashError> {
        self.by_type.get(&hash_type).copied().ok_or_else(|| {
            HashError::UnknownHashType(format!(
                "{} (id {}) is not registered",
                hash_type,
                hash_type.id()
            ))
        })
    }

    /// Returns the descriptor for a persisted identifier byte.
    pub fn find_by_id(&self, id: u8) -> Result<&'static HashInfo, HashError> {
        self.find(HashType::try_from(id)?)
    }

    /// Returns true if `hash_type` is registered.
    pub fn contains(&self, hash_type: HashType) -> bool {
        self.by_type.contains_key(&hash_type)
    }

    /// Iterates every distinct descriptor once. Aliases do not repeat their target.
    pub fn all(&self) -> impl Iterator<Item = &'static HashInfo> + '_ {
        self.infos.iter().copied()
    }

    /// Iterates every registered identifier, aliases included.
    pub fn hash_types(&self) -> impl Iterator<Item = HashType> + '_ {
        self.by_type.keys().copied()
    }

    /// Constructs one content hasher per registered identifier.
    ///
    /// Meant for discovery and benchmarks, not for hot paths.
    pub fn create_all(&self) -> HashMap<HashType, Box<dyn ContentHasher>> {
        self.by_type
            .iter()
            .map(|(&hash_type, info)| (hash_type, info.create_content_hasher()))
            .collect()
    }
}

impl Default for HashRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_complete() {
        let registry = HashRegistry::new();
        for t in HashType::ALL {
            assert!(registry.contains(t), "{} missing", t);
            assert_eq!(registry.find(t).unwrap().hash_type(), t.canonical());
        }
        assert_eq!(registry.all().count(), HashType::ALL.len() - 1);
        assert_eq!(registry.hash_types().count(), HashType::ALL.len());
    }

    #[test]
    fn test_alias_shares_descriptor() {
        let registry = HashRegistry::new();
        let canonical = registry.find(HashType::Vso0).unwrap();
        let alias = registry.find(HashType::DeprecatedVso0).unwrap();
        assert!(std::ptr::eq(canonical, alias));
    }

    #[test]
    fn test_find_unregistered() {
        let mut registry = HashRegistry::empty();
        registry.register(&SHA1_INFO);
        assert!(registry.find(HashType::Sha1).is_ok());
        assert!(matches!(
            registry.find(HashType::Md5),
            Err(HashError::UnknownHashType(_))
        ));
    }

    #[test]
    fn test_alias_requires_target() {
        let mut registry = HashRegistry::empty();
        assert!(
            registry
                .register_alias(HashType::DeprecatedVso0, HashType::Vso0)
                .is_err()
        );
    }

    #[test]
    fn test_alias_cannot_shadow_registered_type() {
        let mut registry = HashRegistry::new();
        assert!(matches!(
            registry.register_alias(HashType::Md5, HashType::Sha1),
            Err(HashError::InvalidConfig { .. })
        ));
        assert!(
            registry
                .register_alias(HashType::DeprecatedVso0, HashType::Vso0)
                .is_err()
        );

        // Every listed descriptor is still what its own type resolves to
        for info in registry.all() {
            assert!(std::ptr::eq(registry.find(info.hash_type()).unwrap(), info));
        }
        assert_eq!(registry.find(HashType::Md5).unwrap().hash_type(), HashType::Md5);
    }

    #[test]
    fn test_register_does_not_replace_alias() {
        let mut registry = HashRegistry::empty();
        registry.register(&SHA1_INFO);
        registry
            .register_alias(HashType::Md5, HashType::Sha1)
            .unwrap();
        registry.register(&MD5_INFO);

        assert_eq!(registry.all().count(), 1);
        assert_eq!(registry.find(HashType::Md5).unwrap().hash_type(), HashType::Sha1);
    }

    #[test]
    fn test_register_twice_is_noop() {
        let mut registry = HashRegistry::empty();
        registry.register(&MD5_INFO).register(&MD5_INFO);
        assert_eq!(registry.all().count(), 1);
    }

    #[test]
    fn test_find_by_id() {
        let registry = HashRegistry::new();
        assert_eq!(
            registry.find_by_id(2).unwrap().hash_type(),
            HashType::Sha256
        );
        assert!(registry.find_by_id(0).is_err());
    }

    #[test]
    fn test_create_all() {
        let registry = HashRegistry::new();
        let hashers = registry.create_all();
        assert_eq!(hashers.len(), HashType::ALL.len());
        assert_eq!(
            hashers[&HashType::DeprecatedVso0].hash_type(),
            HashType::Vso0
        );
    }
}
