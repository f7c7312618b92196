//! Expiring key/value cache collaborator.
//!
//! Secrets are cached in an external store with per-entry expiry. The store
//! may be shared across processes; the only write primitive is set-if-absent,
//! so entries are never overwritten while unexpired and no locking is needed
//! beyond what the store itself provides. Concurrent callers may both miss
//! and both fetch remotely; that wastes a call but stays correct.

use crate::clock::Clock;
use crate::store::SecretValue;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Key/value store with per-entry expiry and set-if-absent writes.
#[async_trait]
pub trait ExpiringCache: Send + Sync + std::fmt::Debug {
    /// Whether an unexpired entry exists for the key.
    async fn exists(&self, key: &str) -> bool;

    /// Read an unexpired entry.
    async fn get(&self, key: &str) -> Option<SecretValue>;

    /// Store a value unless an unexpired entry already holds the key.
    ///
    /// Returns whether the value was stored. An expired entry counts as
    /// absent and is replaced.
    async fn set_if_absent(&self, key: &str, value: SecretValue, expires_at: DateTime<Utc>)
        -> bool;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: SecretValue,
    expires_at: DateTime<Utc>,
}

/// In-process [`ExpiringCache`] implementation.
///
/// Suitable for single-process deployments and tests. Deployments sharing
/// secrets across processes should implement the trait over a shared store
/// (Redis, memcached) instead.
#[derive(Debug)]
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Create an empty cache reading time from the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), clock }
    }

    /// Remove expired entries.
    pub async fn purge_expired(&self) {
        let now = self.clock.now();
        let mut cache = self.inner.write().await;

        cache.retain(|key, entry| {
            let expired = entry.expires_at <= now;
            if expired {
                debug!(key = %key, "Removing expired cache entry");
            }
            !expired
        });
    }

    /// Number of entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ExpiringCache for MemoryCache {
    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    async fn get(&self, key: &str) -> Option<SecretValue> {
        let now = self.clock.now();
        let cache = self.inner.read().await;

        match cache.get(key) {
            Some(entry) if entry.expires_at > now => {
                debug!(key = %key, "Cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(key = %key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: SecretValue,
        expires_at: DateTime<Utc>,
    ) -> bool {
        let now = self.clock.now();
        let mut cache = self.inner.write().await;

        if let Some(entry) = cache.get(key) {
            if entry.expires_at > now {
                return false;
            }
        }

        debug!(key = %key, expires_at = %expires_at, "Caching value");
        cache.insert(key.to_string(), CacheEntry { value, expires_at });
        true
    }
}

impl Clone for MemoryCache {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), clock: Arc::clone(&self.clock) }
    }
}
