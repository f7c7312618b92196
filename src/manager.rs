//! Cache-first secret resolution.
//!
//! The manager orchestrates the lookup path for each logical key: regular
//! cache tier, then backup tier, then the remote store, writing both tiers
//! back on a successful fetch. Failures never propagate to the caller; a
//! key that cannot be resolved degrades to an empty value and the failure is
//! reported through the throttled [`FailureNotifier`].

use crate::cache::ExpiringCache;
use crate::clock::Clock;
use crate::config::SecretsConfig;
use crate::error::Result;
use crate::naming::render_remote_name;
use crate::notify::FailureNotifier;
use crate::store::{SecretStore, SecretValue};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Resolves logical secret keys to values through a two-tier expiring cache.
///
/// Every collaborator is passed in explicitly, so tests can substitute the
/// store, the cache, and the clock.
#[derive(Debug)]
pub struct SecretCacheManager {
    store: Arc<dyn SecretStore>,
    cache: Arc<dyn ExpiringCache>,
    clock: Arc<dyn Clock>,
    notifier: FailureNotifier,
    config: SecretsConfig,
    env_tag: String,
    regular_ttl: Duration,
    backup_ttl: Duration,
}

impl SecretCacheManager {
    /// Create a manager.
    ///
    /// Validates the configuration and parses the cache intervals once;
    /// a bad configuration is rejected here, at startup, rather than
    /// surfacing during resolution.
    pub fn new(
        store: Arc<dyn SecretStore>,
        cache: Arc<dyn ExpiringCache>,
        clock: Arc<dyn Clock>,
        config: SecretsConfig,
    ) -> Result<Self> {
        config.validate()?;

        let notifier = FailureNotifier::new(Arc::clone(&cache), Arc::clone(&clock), &config)?;

        Ok(Self {
            store,
            cache,
            clock,
            notifier,
            env_tag: config.env_tag(),
            regular_ttl: config.regular_interval()?,
            backup_ttl: config.backup_interval()?,
            config,
        })
    }

    /// Whether the configured environment is local development.
    pub fn is_local(&self) -> bool {
        self.config.is_local()
    }

    /// Resolve a batch of logical keys.
    ///
    /// The result always contains every requested key. Keys that could not
    /// be resolved map to [`SecretValue::Null`]; a per-key retrieval failure
    /// leaves the rest of the batch running, while a store-level failure
    /// abandons the remaining keys.
    pub async fn resolve_secrets(&self, keys: &[&str]) -> HashMap<String, SecretValue> {
        let mut results: HashMap<String, SecretValue> =
            keys.iter().map(|key| (key.to_string(), SecretValue::Null)).collect();

        for &key in keys {
            if let Some(value) = self.lookup_cached(key).await {
                results.insert(key.to_string(), value);
                continue;
            }

            match self.fetch_and_cache(key).await {
                Ok(value) => {
                    results.insert(key.to_string(), value);
                }
                Err(err) if err.is_per_key() => {
                    self.notifier.notify(&err.to_string(), Some(key)).await;
                }
                Err(err) => {
                    // A store-level failure is not attributable to one key.
                    self.notifier.notify(&err.to_string(), None).await;
                    break;
                }
            }
        }

        results
    }

    /// Resolve a single logical key to its bare value.
    ///
    /// A primitive comes back as the primitive, a credentials mapping as the
    /// mapping itself with no extra nesting under the key. Unresolvable keys
    /// come back as [`SecretValue::Null`].
    pub async fn resolve_secret(&self, key: &str) -> SecretValue {
        let mut results = self.resolve_secrets(&[key]).await;
        results.remove(key).unwrap_or(SecretValue::Null)
    }

    fn cache_key(&self, key: &str) -> String {
        format!("{}-{}-{}", self.config.cache_key_prefix, self.config.project_tag, key)
    }

    fn backup_cache_key(&self, key: &str) -> String {
        format!("{}-backup", self.cache_key(key))
    }

    /// Cache lookup: the regular tier first, then the backup tier.
    ///
    /// A backup hit re-warms the regular tier so the window where every
    /// caller pays the extra lookup stays short.
    async fn lookup_cached(&self, key: &str) -> Option<SecretValue> {
        if let Some(value) = self.cache.get(&self.cache_key(key)).await {
            return Some(value);
        }

        let backup = self.cache.get(&self.backup_cache_key(key)).await?;

        debug!(key = %key, "Serving secret from backup cache tier");
        let expires_at = self.clock.now() + self.regular_ttl;
        self.cache.set_if_absent(&self.cache_key(key), backup.clone(), expires_at).await;

        Some(backup)
    }

    async fn fetch_and_cache(&self, key: &str) -> Result<SecretValue> {
        let name = render_remote_name(
            &self.config.secret_name_format,
            key,
            &self.config.project_tag,
            &self.env_tag,
        );

        debug!(key = %key, name = %name, store = %self.store.kind(), "Fetching secret from remote store");

        let value = self.store.fetch_secret(&name).await?;

        let now = self.clock.now();
        self.cache.set_if_absent(&self.cache_key(key), value.clone(), now + self.regular_ttl).await;
        self.cache
            .set_if_absent(&self.backup_cache_key(key), value.clone(), now + self.backup_ttl)
            .await;

        Ok(value)
    }
}
