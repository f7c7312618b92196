//! Boot-time injection of resolved secrets into connection configuration.
//!
//! Applications keep a tree of named connection configs (databases, brokers)
//! and flag the ones whose credentials live in the secret store. At boot the
//! flagged connections are resolved as one batch and their fields rewritten
//! in place. A connection whose resolution degraded to empty keeps its local
//! values, and in a local environment nothing is touched at all.

use crate::manager::SecretCacheManager;
use crate::store::SecretValue;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Connection config field that opts a connection into remote secrets.
const USE_SECRETS_FLAG: &str = "use_secrets";

/// Whether a resolved value carries no usable data.
fn is_empty_value(value: &SecretValue) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Rewrite flagged connection configs with values from the secret store.
///
/// Each entry of `connections` is a named connection object; those carrying
/// `"use_secrets": true` are resolved under their connection name as the
/// logical key, and every field of the fetched mapping is written over the
/// connection's config. Unflagged connections, connections that failed to
/// resolve, and non-mapping payloads are left untouched.
pub async fn inject_connection_secrets(
    manager: &SecretCacheManager,
    connections: &mut Map<String, Value>,
) {
    if manager.is_local() {
        debug!("Local environment, keeping local connection credentials");
        return;
    }

    let flagged: Vec<String> = connections
        .iter()
        .filter(|(_, conn)| {
            conn.get(USE_SECRETS_FLAG).and_then(Value::as_bool).unwrap_or(false)
        })
        .map(|(name, _)| name.clone())
        .collect();

    if flagged.is_empty() {
        return;
    }

    let keys: Vec<&str> = flagged.iter().map(String::as_str).collect();
    let resolved = manager.resolve_secrets(&keys).await;

    for (name, data) in resolved {
        if is_empty_value(&data) {
            // No data came back for this connection; keep what is there.
            continue;
        }

        let Some(fields) = data.as_object() else {
            warn!(connection = %name, "Secret payload is not a mapping, keeping local config");
            continue;
        };

        if let Some(conn) = connections.get_mut(&name).and_then(Value::as_object_mut) {
            for (field, value) in fields {
                conn.insert(field.clone(), value.clone());
            }
            info!(connection = %name, "Applied remote credentials to connection config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::clock::ManualClock;
    use crate::config::SecretsConfig;
    use crate::error::{Result, SecretsError};
    use crate::store::SecretStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct FixtureStore {
        values: HashMap<String, SecretValue>,
    }

    #[async_trait]
    impl SecretStore for FixtureStore {
        async fn fetch_secret(&self, name: &str) -> Result<SecretValue> {
            self.values
                .get(name)
                .cloned()
                .ok_or_else(|| SecretsError::retrieval(name, "not found"))
        }

        fn kind(&self) -> &'static str {
            "fixture"
        }
    }

    fn manager_with(environment: &str, values: &[(&str, SecretValue)]) -> SecretCacheManager {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()));
        let cache = Arc::new(MemoryCache::new(clock.clone()));
        let store = Arc::new(FixtureStore {
            values: values.iter().map(|(n, v)| (n.to_string(), v.clone())).collect(),
        });
        let config = SecretsConfig {
            project_tag: "acme".to_string(),
            environment: environment.to_string(),
            ..Default::default()
        };

        SecretCacheManager::new(store, cache, clock, config).unwrap()
    }

    fn connections() -> Map<String, Value> {
        json!({
            "primary": {
                "use_secrets": true,
                "host": "localhost",
                "username": "local-user",
                "password": "local-pass"
            },
            "reporting": {
                "host": "reports.internal",
                "username": "reports",
                "password": "reports-pass"
            }
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[tokio::test]
    async fn test_flagged_connection_is_rewritten() {
        let manager = manager_with(
            "staging",
            &[(
                "staging/acme/primary",
                json!({ "host": "db.prod.internal", "username": "svc", "password": "s3cret" }),
            )],
        );
        let mut conns = connections();

        inject_connection_secrets(&manager, &mut conns).await;

        assert_eq!(conns["primary"]["host"], "db.prod.internal");
        assert_eq!(conns["primary"]["username"], "svc");
        assert_eq!(conns["primary"]["password"], "s3cret");
        // The opt-in flag itself stays around.
        assert_eq!(conns["primary"]["use_secrets"], true);
    }

    #[tokio::test]
    async fn test_unflagged_connection_is_untouched() {
        let manager = manager_with(
            "staging",
            &[("staging/acme/reporting", json!({ "password": "stolen" }))],
        );
        let mut conns = connections();

        inject_connection_secrets(&manager, &mut conns).await;

        assert_eq!(conns["reporting"]["password"], "reports-pass");
    }

    #[tokio::test]
    async fn test_failed_resolution_keeps_local_values() {
        let manager = manager_with("staging", &[]);
        let mut conns = connections();

        inject_connection_secrets(&manager, &mut conns).await;

        assert_eq!(conns["primary"]["username"], "local-user");
        assert_eq!(conns["primary"]["password"], "local-pass");
    }

    #[tokio::test]
    async fn test_local_environment_skips_injection() {
        let manager = manager_with(
            "local",
            &[("local/acme/primary", json!({ "password": "remote" }))],
        );
        let mut conns = connections();

        inject_connection_secrets(&manager, &mut conns).await;

        assert_eq!(conns["primary"]["password"], "local-pass");
    }

    #[tokio::test]
    async fn test_primitive_payload_is_skipped() {
        let manager = manager_with(
            "staging",
            &[("staging/acme/primary", SecretValue::String("just-a-string".to_string()))],
        );
        let mut conns = connections();

        inject_connection_secrets(&manager, &mut conns).await;

        assert_eq!(conns["primary"]["password"], "local-pass");
    }
}
