//! Remote secret store backends.
//!
//! A store exposes a single fetch operation keyed by the fully-qualified
//! remote secret name. Which backend gets instantiated is decided by the
//! `manager` configuration string through [`StoreRegistry`].

pub mod backend;
pub mod env;
pub mod registry;
pub mod vault;

pub use backend::{SecretStore, SecretValue};
pub use env::EnvSecretStore;
pub use registry::StoreRegistry;
pub use vault::{VaultSecretStore, VaultStoreConfig};
