//! Environment variable secret store.
//!
//! Development and testing backend: secrets are read from environment
//! variables derived from the fully-qualified remote name. Not for
//! production use; the values sit unencrypted in the process environment.
//!
//! A remote name like `staging/acme/db` maps to `SECRETBOOT_SECRET_STAGING_ACME_DB`.
//! The variable's value is parsed as JSON when possible (a credentials
//! mapping), otherwise returned as a plain string primitive.

use super::backend::{SecretStore, SecretValue};
use crate::error::{Result, SecretsError};
use async_trait::async_trait;
use std::env;
use tracing::debug;

/// Environment variable prefix for secrets.
const SECRET_PREFIX: &str = "SECRETBOOT_SECRET_";

/// Secret store reading from environment variables (development only).
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a fully-qualified remote name to its environment variable name.
    fn name_to_env_var(name: &str) -> String {
        let normalized: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();

        format!("{}{}", SECRET_PREFIX, normalized)
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn fetch_secret(&self, name: &str) -> Result<SecretValue> {
        let env_var = Self::name_to_env_var(name);

        let raw = env::var(&env_var).map_err(|_| {
            SecretsError::retrieval(
                name,
                format!("not found in environment (looking for {})", env_var),
            )
        })?;

        debug!(name = %name, env_var = %env_var, "Read secret from environment");

        // Structured payloads arrive as JSON; anything else is a bare string.
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(_) => Ok(SecretValue::String(raw)),
        }
    }

    fn kind(&self) -> &'static str {
        "env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_to_env_var() {
        assert_eq!(
            EnvSecretStore::name_to_env_var("staging/acme/db"),
            "SECRETBOOT_SECRET_STAGING_ACME_DB"
        );
        assert_eq!(
            EnvSecretStore::name_to_env_var("prod/my-app/primary-db"),
            "SECRETBOOT_SECRET_PROD_MY_APP_PRIMARY_DB"
        );
    }

    #[tokio::test]
    async fn test_fetch_json_payload() {
        env::set_var("SECRETBOOT_SECRET_TEST_ACME_DB", r#"{"username":"u","password":"p"}"#);

        let store = EnvSecretStore::new();
        let value = store.fetch_secret("test/acme/db").await.unwrap();
        assert_eq!(value["username"], "u");

        env::remove_var("SECRETBOOT_SECRET_TEST_ACME_DB");
    }

    #[tokio::test]
    async fn test_fetch_plain_string_payload() {
        env::set_var("SECRETBOOT_SECRET_TEST_ACME_TOKEN", "s3cr3t-token");

        let store = EnvSecretStore::new();
        let value = store.fetch_secret("test/acme/token").await.unwrap();
        assert_eq!(value, SecretValue::String("s3cr3t-token".to_string()));

        env::remove_var("SECRETBOOT_SECRET_TEST_ACME_TOKEN");
    }

    #[tokio::test]
    async fn test_missing_variable_is_a_retrieval_error() {
        let store = EnvSecretStore::new();
        let err = store.fetch_secret("test/acme/missing").await.unwrap_err();
        assert!(matches!(err, SecretsError::Retrieval { .. }));
    }
}
