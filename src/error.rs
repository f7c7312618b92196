//! Error types for secret resolution operations.

use thiserror::Error;

/// Result type for secret resolution operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while resolving secrets.
///
/// The variants split along recovery boundaries: [`Retrieval`] is contained to
/// a single logical key, [`Store`] aborts the remaining keys of a batch, and
/// [`Config`] is fatal at startup.
///
/// [`Retrieval`]: SecretsError::Retrieval
/// [`Store`]: SecretsError::Store
/// [`Config`]: SecretsError::Config
#[derive(Error, Debug)]
pub enum SecretsError {
    /// A named secret could not be fetched or parsed.
    #[error("Failed to retrieve secret '{name}': {reason}")]
    Retrieval { name: String, reason: String },

    /// The secret store itself is unreachable or misbehaving.
    #[error("Secret store failure: {message}")]
    Store { message: String },

    /// Deployment misconfiguration, raised immediately at startup.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Secret payload serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SecretsError {
    /// Create a retrieval error scoped to one secret name.
    pub fn retrieval(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Retrieval { name: name.into(), reason: reason.into() }
    }

    /// Create a store-level error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store { message: message.into() }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Whether this failure is contained to a single logical key.
    pub fn is_per_key(&self) -> bool {
        matches!(self, Self::Retrieval { .. } | Self::Serialization(_))
    }
}
