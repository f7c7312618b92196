//! HashiCorp Vault secret store.
//!
//! Fetches secrets from the KV v2 engine; the fully-qualified remote name is
//! the path within the configured KV mount.

use super::backend::{SecretStore, SecretValue};
use crate::error::{Result, SecretsError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv2;

/// Configuration for the Vault store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultStoreConfig {
    /// Vault server address.
    pub address: String,
    /// Vault authentication token.
    pub token: Option<String>,
    /// Vault namespace (Enterprise).
    pub namespace: Option<String>,
    /// KV v2 mount path.
    #[serde(default = "default_kv_mount")]
    pub kv_mount_path: String,
}

fn default_kv_mount() -> String {
    "secret".to_string()
}

impl VaultStoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Uses:
    /// - `SECRETBOOT_VAULT_ADDR` or `VAULT_ADDR` (required)
    /// - `SECRETBOOT_VAULT_TOKEN` or `VAULT_TOKEN`
    /// - `SECRETBOOT_VAULT_NAMESPACE` or `VAULT_NAMESPACE`
    /// - `SECRETBOOT_VAULT_KV_MOUNT` (default: "secret")
    pub fn from_env() -> Result<Self> {
        let address = std::env::var("SECRETBOOT_VAULT_ADDR")
            .or_else(|_| std::env::var("VAULT_ADDR"))
            .map_err(|_| {
                SecretsError::config(
                    "Vault store selected but neither SECRETBOOT_VAULT_ADDR nor VAULT_ADDR is set",
                )
            })?;

        let token = std::env::var("SECRETBOOT_VAULT_TOKEN")
            .or_else(|_| std::env::var("VAULT_TOKEN"))
            .ok();

        let namespace = std::env::var("SECRETBOOT_VAULT_NAMESPACE")
            .or_else(|_| std::env::var("VAULT_NAMESPACE"))
            .ok();

        let kv_mount_path =
            std::env::var("SECRETBOOT_VAULT_KV_MOUNT").unwrap_or_else(|_| default_kv_mount());

        Ok(Self { address, token, namespace, kv_mount_path })
    }
}

/// Secret store backed by Vault KV v2.
pub struct VaultSecretStore {
    client: VaultClient,
    kv_mount_path: String,
}

impl std::fmt::Debug for VaultSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretStore")
            .field("kv_mount_path", &self.kv_mount_path)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl VaultSecretStore {
    /// Create a new Vault store with the given configuration.
    pub fn new(config: VaultStoreConfig) -> Result<Self> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token);
        }

        if let Some(ref namespace) = config.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        let settings = settings_builder
            .build()
            .map_err(|e| SecretsError::config(format!("Invalid Vault store configuration: {}", e)))?;

        let client = VaultClient::new(settings)
            .map_err(|e| SecretsError::config(format!("Failed to create Vault client: {}", e)))?;

        info!(address = %config.address, kv_mount = %config.kv_mount_path, "Initialized Vault secret store");

        Ok(Self { client, kv_mount_path: config.kv_mount_path })
    }

    /// Create a store from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(VaultStoreConfig::from_env()?)
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn fetch_secret(&self, name: &str) -> Result<SecretValue> {
        debug!(name = %name, kv_mount = %self.kv_mount_path, "Fetching secret from Vault");

        let data: HashMap<String, serde_json::Value> =
            kv2::read(&self.client, &self.kv_mount_path, name).await.map_err(|e| match e {
                // The server answered: the problem is scoped to this secret.
                ClientError::APIError { code, errors } => {
                    warn!(name = %name, code = %code, "Vault rejected secret read");
                    SecretsError::retrieval(
                        name,
                        format!("Vault returned status {}: {}", code, errors.join("; ")),
                    )
                }
                other => SecretsError::store(format!("Vault request failed: {}", other)),
            })?;

        Ok(serde_json::Value::Object(data.into_iter().collect()))
    }

    fn kind(&self) -> &'static str {
        "vault"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> VaultSecretStore {
        VaultSecretStore::new(VaultStoreConfig {
            address: server.uri(),
            token: Some("test-token".to_string()),
            namespace: None,
            kv_mount_path: default_kv_mount(),
        })
        .expect("store should build")
    }

    #[tokio::test]
    async fn test_fetch_secret_returns_payload_mapping() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/secret/data/staging/acme/db"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request_id": "b1c2",
                "lease_id": "",
                "lease_duration": 0,
                "renewable": false,
                "data": {
                    "data": { "username": "svc-user", "password": "hunter2" },
                    "metadata": {
                        "created_time": "2024-01-01T00:00:00Z",
                        "deletion_time": "",
                        "destroyed": false,
                        "version": 3
                    }
                }
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let value = store.fetch_secret("staging/acme/db").await.unwrap();

        assert_eq!(value["username"], "svc-user");
        assert_eq!(value["password"], "hunter2");
    }

    #[tokio::test]
    async fn test_missing_secret_is_a_retrieval_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/secret/data/staging/acme/absent"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({ "errors": [] })),
            )
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.fetch_secret("staging/acme/absent").await.unwrap_err();

        assert!(matches!(err, SecretsError::Retrieval { .. }), "got {:?}", err);
    }

    #[test]
    fn test_config_default_mount() {
        let config = VaultStoreConfig {
            address: "http://localhost:8200".to_string(),
            token: None,
            namespace: None,
            kv_mount_path: default_kv_mount(),
        };
        assert_eq!(config.kv_mount_path, "secret");
    }

    #[test]
    fn test_kind_label() {
        let server_less = VaultSecretStore::new(VaultStoreConfig {
            address: "http://localhost:8200".to_string(),
            token: Some("t".to_string()),
            namespace: None,
            kv_mount_path: default_kv_mount(),
        })
        .unwrap();
        assert_eq!(server_less.kind(), "vault");
    }
}
