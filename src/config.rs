//! Configuration surface for secret resolution.
//!
//! All settings are read from environment variables with sensible defaults,
//! validated once at startup. Invalid configuration is a deployment error and
//! fails fast; it is never degraded or suppressed.

use crate::error::{Result, SecretsError};
use crate::notify::Severity;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Environment names classified as production.
const PRODUCTION_ENVIRONMENTS: &[&str] = &["prod", "production", "produccion", "producción"];

/// Environment name classified as local development.
const LOCAL_ENVIRONMENT: &str = "local";

/// Settings for secret resolution, caching, and failure notifications.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecretsConfig {
    /// TTL for the regular cache tier, e.g. "30s".
    #[validate(length(min = 1, message = "Regular cache interval cannot be empty"))]
    pub cache_interval: String,

    /// TTL for the backup cache tier, e.g. "12h".
    #[validate(length(min = 1, message = "Backup cache interval cannot be empty"))]
    pub backup_cache_interval: String,

    /// Throttle window for failure notifications, e.g. "10s".
    #[validate(length(min = 1, message = "Notification cache interval cannot be empty"))]
    pub notification_cache_interval: String,

    /// Prefix for secret-data cache keys.
    #[validate(length(min = 1, message = "Cache key prefix cannot be empty"))]
    pub cache_key_prefix: String,

    /// Prefix for notification-sent cache keys.
    #[validate(length(min = 1, message = "Notification cache key prefix cannot be empty"))]
    pub notification_cache_key_prefix: String,

    /// RFC 5424 severity level used when logging retrieval failures.
    #[validate(length(min = 1, message = "Severity level cannot be empty"))]
    pub severity_level: String,

    /// Project identifier embedded in cache keys and remote secret names.
    #[validate(length(min = 1, message = "Project tag cannot be empty"))]
    pub project_tag: String,

    /// Identifier of the secret store backend to instantiate.
    #[validate(length(min = 1, message = "Manager identifier cannot be empty"))]
    pub manager: String,

    /// Remote name template with `$key`, `$project`, and `$env` placeholders.
    #[validate(length(min = 1, message = "Secret name format cannot be empty"))]
    pub secret_name_format: String,

    /// Canonical tag substituted for any production-classified environment.
    pub production_tag: String,

    /// Raw environment name the application is running in.
    #[validate(length(min = 1, message = "Environment cannot be empty"))]
    pub environment: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            cache_interval: "30s".to_string(),
            backup_cache_interval: "12h".to_string(),
            notification_cache_interval: "10s".to_string(),
            cache_key_prefix: "secret-data".to_string(),
            notification_cache_key_prefix: "notification-sent-secret".to_string(),
            severity_level: "critical".to_string(),
            project_tag: default_project_tag(),
            manager: "vault".to_string(),
            secret_name_format: "$env/$project/$key".to_string(),
            production_tag: "prod".to_string(),
            environment: "production".to_string(),
        }
    }
}

impl SecretsConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            cache_interval: env_or("SECRETBOOT_CACHE_INTERVAL", &defaults.cache_interval),
            backup_cache_interval: env_or(
                "SECRETBOOT_CACHE_BACKUP_INTERVAL",
                &defaults.backup_cache_interval,
            ),
            notification_cache_interval: env_or(
                "SECRETBOOT_CACHE_NOTIFICATION_INTERVAL",
                &defaults.notification_cache_interval,
            ),
            cache_key_prefix: env_or("SECRETBOOT_CACHE_KEY_PREFIX", &defaults.cache_key_prefix),
            notification_cache_key_prefix: env_or(
                "SECRETBOOT_NOTIFICATION_CACHE_KEY_PREFIX",
                &defaults.notification_cache_key_prefix,
            ),
            severity_level: env_or("SECRETBOOT_SEVERITY_LEVEL", &defaults.severity_level),
            project_tag: env_or("SECRETBOOT_PROJECT_TAG", &defaults.project_tag),
            manager: env_or("SECRETBOOT_MANAGER", &defaults.manager),
            secret_name_format: env_or("SECRETBOOT_NAME_FORMAT", &defaults.secret_name_format),
            production_tag: env_or("SECRETBOOT_PRODUCTION_TAG", &defaults.production_tag),
            environment: std::env::var("SECRETBOOT_ENV")
                .or_else(|_| std::env::var("APP_ENV"))
                .unwrap_or(defaults.environment),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self)
            .map_err(|e| SecretsError::config(format!("Invalid configuration: {}", e)))?;

        self.validate_custom()
    }

    /// Validation beyond what the validator derive can express.
    fn validate_custom(&self) -> Result<()> {
        self.regular_interval()?;
        self.backup_interval()?;
        self.notification_interval()?;
        Severity::parse(&self.severity_level)?;
        Ok(())
    }

    /// Parsed TTL for the regular cache tier.
    pub fn regular_interval(&self) -> Result<Duration> {
        parse_interval(&self.cache_interval)
    }

    /// Parsed TTL for the backup cache tier.
    pub fn backup_interval(&self) -> Result<Duration> {
        parse_interval(&self.backup_cache_interval)
    }

    /// Parsed throttle window for failure notifications.
    pub fn notification_interval(&self) -> Result<Duration> {
        parse_interval(&self.notification_cache_interval)
    }

    /// Whether the configured environment is classified as production.
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        PRODUCTION_ENVIRONMENTS.contains(&env.as_str())
    }

    /// Whether the configured environment is local development.
    pub fn is_local(&self) -> bool {
        self.environment.to_lowercase() == LOCAL_ENVIRONMENT
    }

    /// Normalized environment tag used in remote names and notifications.
    ///
    /// The raw environment name is lowercased; production-classified
    /// environments are overridden by the production tag when one is set.
    pub fn env_tag(&self) -> String {
        let tag = self.environment.to_lowercase();

        if self.is_production() && !self.production_tag.is_empty() {
            return self.production_tag.clone();
        }

        tag
    }
}

/// Read an environment variable, or fall back to the given default.
fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Default project tag, derived from `APP_NAME` when present.
fn default_project_tag() -> String {
    std::env::var("APP_NAME")
        .map(|name| slug(&name))
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "secretboot-project".to_string())
}

/// Lowercase a name into a dash-separated tag.
fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_dash = true;

    for ch in value.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    out.trim_end_matches('-').to_string()
}

/// Parse a duration string like "45s", "30m", "12h", or "90d".
pub fn parse_interval(value: &str) -> Result<Duration> {
    if value.len() < 2 {
        return Err(SecretsError::config(format!(
            "Invalid interval '{}': expected format like 90d, 12h, 30m, 45s",
            value
        )));
    }

    let (number, unit) = value.split_at(value.len() - 1);
    let quantity: i64 = number.parse().map_err(|err| {
        SecretsError::config(format!("Invalid interval '{}': {}", value, err))
    })?;

    match unit {
        "d" | "D" => Ok(Duration::days(quantity)),
        "h" | "H" => Ok(Duration::hours(quantity)),
        "m" | "M" => Ok(Duration::minutes(quantity)),
        "s" | "S" => Ok(Duration::seconds(quantity)),
        _ => Err(SecretsError::config(format!(
            "Invalid interval unit '{}': expected one of d (days), h (hours), m (minutes), s (seconds)",
            unit
        ))),
    }
}
