//! Secret store trait and value type.

use crate::error::Result;
use async_trait::async_trait;

/// A fetched secret payload: a mapping of field names to primitives for
/// structured secrets (e.g. database credentials), or a bare primitive.
pub type SecretValue = serde_json::Value;

/// A remote store that secrets are fetched from by fully-qualified name.
///
/// Implementations must map their failures onto the error taxonomy:
/// secret-specific problems (missing, denied, unparseable payload) become
/// [`SecretsError::Retrieval`] so one bad secret cannot poison a whole batch,
/// while transport-level problems become [`SecretsError::Store`] and abort
/// the batch.
///
/// [`SecretsError::Retrieval`]: crate::error::SecretsError::Retrieval
/// [`SecretsError::Store`]: crate::error::SecretsError::Store
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Fetch a secret by its fully-qualified remote name.
    async fn fetch_secret(&self, name: &str) -> Result<SecretValue>;

    /// Short backend label used in logs.
    fn kind(&self) -> &'static str;
}
