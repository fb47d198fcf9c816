//! Injected caching capability and cache-key construction.
//!
//! Downsize results and synthesized metadata are recomputed cheaply but
//! repeatedly — once per rendered image tag — so both are memoized behind a
//! small get/set capability the host supplies. edgesize specifies no
//! eviction or expiry policy: entries are idempotently recomputed on a miss,
//! so concurrent recomputation of the same key is safe, merely redundant.
//!
//! [`MemoryCache`] is the stock process-local implementation; hosts with a
//! shared object cache implement [`Cache`] over it instead.
//!
//! ## Keys
//!
//! - Downsize results: SHA-256 over `<id>_<canonical descriptor JSON>`.
//!   [`SizeDescriptor`](crate::sizes::SizeDescriptor) has exactly one
//!   serialized form per value, so equal descriptors always hit the same key.
//! - Synthesized metadata: `sizes_<id>`.

use crate::media::AttachmentId;
use crate::sizes::SizeDescriptor;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

/// Key prefix for synthesized-metadata entries.
pub const METADATA_KEY_PREFIX: &str = "sizes_";

/// A get/set cache over values of type `V`.
///
/// Interior mutability is required: the rewriter holds the cache behind a
/// shared reference. Implementations over an external store serialize `V`
/// however they like.
pub trait Cache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V);
}

/// Process-local cache over a hash map. No eviction — entries live for the
/// process lifetime, which matches the request-scoped usage pattern.
#[derive(Debug, Default)]
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send + Sync> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: V) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value);
        }
    }
}

impl<V, C: Cache<V>> Cache<V> for std::sync::Arc<C> {
    fn get(&self, key: &str) -> Option<V> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: V) {
        (**self).set(key, value)
    }
}

/// Cache key for a downsize result.
pub fn downsize_key(id: AttachmentId, size: &SizeDescriptor) -> String {
    // Serialization of SizeDescriptor is infallible (strings and integers)
    let descriptor = serde_json::to_string(size).unwrap_or_default();
    let digest = Sha256::digest(format!("{id}_{descriptor}").as_bytes());
    format!("{digest:x}")
}

/// Cache key for an attachment's synthesized metadata.
pub fn metadata_key(id: AttachmentId) -> String {
    format!("{METADATA_KEY_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // MemoryCache
    // =========================================================================

    #[test]
    fn memory_cache_get_set() {
        let cache: MemoryCache<String> = MemoryCache::new();
        assert_eq!(cache.get("k"), None);
        cache.set("k", "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn memory_cache_overwrites() {
        let cache: MemoryCache<u32> = MemoryCache::new();
        cache.set("k", 1);
        cache.set("k", 2);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    // =========================================================================
    // Key construction
    // =========================================================================

    #[test]
    fn downsize_key_is_deterministic() {
        let size = SizeDescriptor::Named("medium".into());
        assert_eq!(downsize_key(123, &size), downsize_key(123, &size));
        assert_eq!(downsize_key(123, &size).len(), 64);
    }

    #[test]
    fn downsize_key_varies_with_id() {
        let size = SizeDescriptor::Full;
        assert_ne!(downsize_key(1, &size), downsize_key(2, &size));
    }

    #[test]
    fn downsize_key_varies_with_descriptor() {
        assert_ne!(
            downsize_key(1, &SizeDescriptor::Named("medium".into())),
            downsize_key(1, &SizeDescriptor::Dimensions(300, 300))
        );
        assert_ne!(
            downsize_key(1, &SizeDescriptor::Dimensions(300, 200)),
            downsize_key(1, &SizeDescriptor::Dimensions(200, 300))
        );
    }

    #[test]
    fn metadata_key_uses_prefix() {
        assert_eq!(metadata_key(123), "sizes_123");
    }
}
