//! Secret store registry.
//!
//! Maps the `manager` configuration string to a backend factory. The registry
//! is populated at process startup; an unknown identifier is a deployment
//! misconfiguration and fails fast, it is never deferred to a lazy lookup at
//! resolution time.

use super::backend::SecretStore;
use super::env::EnvSecretStore;
use super::vault::VaultSecretStore;
use crate::config::SecretsConfig;
use crate::error::{Result, SecretsError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Factory building a store from the resolved configuration.
pub type StoreFactory = Box<dyn Fn(&SecretsConfig) -> Result<Arc<dyn SecretStore>> + Send + Sync>;

/// Registry of secret store backends keyed by identifier.
pub struct StoreRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("backends", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StoreRegistry {
    /// Create a registry with no backends.
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Create a registry with the bundled backends registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("vault", |_| Ok(Arc::new(VaultSecretStore::from_env()?)));
        registry.register("env", |_| Ok(Arc::new(EnvSecretStore::new())));

        registry
    }

    /// Register a backend factory under an identifier.
    ///
    /// Registering an identifier again replaces the previous factory, so
    /// applications can override the bundled backends.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&SecretsConfig) -> Result<Arc<dyn SecretStore>> + Send + Sync + 'static,
    {
        let id = id.into();
        info!(backend = %id, "Registering secret store backend");
        self.factories.insert(id, Box::new(factory));
    }

    /// Check whether an identifier has a registered factory.
    pub fn has_backend(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Identifiers of all registered backends.
    pub fn registered_backends(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the store selected by `config.manager`.
    ///
    /// # Errors
    ///
    /// [`SecretsError::Config`] when the identifier has no registered factory
    /// or the factory itself rejects the deployment configuration.
    pub fn build(&self, config: &SecretsConfig) -> Result<Arc<dyn SecretStore>> {
        let factory = self.factories.get(&config.manager).ok_or_else(|| {
            SecretsError::config(format!(
                "'{}' does not identify a registered secret store backend",
                config.manager
            ))
        })?;

        factory(config)
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::SecretValue;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StaticStore;

    #[async_trait]
    impl SecretStore for StaticStore {
        async fn fetch_secret(&self, _name: &str) -> Result<SecretValue> {
            Ok(SecretValue::String("fixed".to_string()))
        }

        fn kind(&self) -> &'static str {
            "static"
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = StoreRegistry::with_builtins();
        assert!(registry.has_backend("vault"));
        assert!(registry.has_backend("env"));
        assert!(!registry.has_backend("aws"));
    }

    #[test]
    fn test_unknown_identifier_fails_fast() {
        let registry = StoreRegistry::with_builtins();
        let config =
            SecretsConfig { manager: "carrier-pigeon".to_string(), ..Default::default() };

        let err = registry.build(&config).unwrap_err();
        assert!(matches!(err, SecretsError::Config { .. }));
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_build_env_backend() {
        let registry = StoreRegistry::with_builtins();
        let config = SecretsConfig { manager: "env".to_string(), ..Default::default() };

        let store = registry.build(&config).unwrap();
        assert_eq!(store.kind(), "env");
    }

    #[test]
    fn test_custom_registration_wins() {
        let mut registry = StoreRegistry::with_builtins();
        registry.register("env", |_| Ok(Arc::new(StaticStore)));

        let config = SecretsConfig { manager: "env".to_string(), ..Default::default() };
        let store = registry.build(&config).unwrap();
        assert_eq!(store.kind(), "static");
    }
}
