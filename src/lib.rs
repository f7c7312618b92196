//! # secretboot
//!
//! Boot-time secret resolution for application configuration: secrets (e.g.
//! database credentials) are fetched from a remote store, cached in an
//! expiring key/value store with a short regular TTL plus a long-lived
//! backup TTL, and substituted into connection configs before the
//! application starts serving.
//!
//! ## Architecture
//!
//! ```text
//! Config Injection → Secret Cache Manager → Secret Store (Vault, env, ...)
//!                          ↓           ↘
//!                   Expiring Cache      Failure Notifier (throttled)
//! ```
//!
//! ## Core Components
//!
//! - **[`SecretCacheManager`]**: cache-first lookup with a two-tier TTL
//!   write-through and per-key error containment
//! - **[`StoreRegistry`]**: maps the configured backend identifier to a
//!   store factory, failing fast on unknown identifiers
//! - **[`FailureNotifier`]**: logs retrieval failures at a configured
//!   severity, at most once per key per notification window
//! - **[`inject_connection_secrets`]**: rewrites flagged connection configs
//!   with the resolved credentials at boot
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use secretboot::{
//!     MemoryCache, SecretCacheManager, SecretsConfig, StoreRegistry, SystemClock,
//! };
//! use std::sync::Arc;
//!
//! # async fn boot() -> secretboot::Result<()> {
//! let config = SecretsConfig::from_env()?;
//! let clock = Arc::new(SystemClock);
//! let cache = Arc::new(MemoryCache::new(clock.clone()));
//! let store = StoreRegistry::with_builtins().build(&config)?;
//!
//! let manager = SecretCacheManager::new(store, cache, clock, config)?;
//! let credentials = manager.resolve_secret("primary-db").await;
//! # Ok(())
//! # }
//! ```
//!
//! Failures degrade instead of propagating: an unresolvable key comes back
//! as an empty value, paired with a throttled log entry, so one bad secret
//! cannot keep the application from booting.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod inject;
pub mod manager;
pub mod naming;
pub mod notify;
pub mod store;

// Re-export main types
pub use cache::{ExpiringCache, MemoryCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SecretsConfig;
pub use error::{Result, SecretsError};
pub use inject::inject_connection_secrets;
pub use manager::SecretCacheManager;
pub use notify::{FailureNotifier, Severity};
pub use store::{
    EnvSecretStore, SecretStore, SecretValue, StoreRegistry, VaultSecretStore, VaultStoreConfig,
};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
    }
}
