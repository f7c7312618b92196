//! Throttled failure notifications.
//!
//! Retrieval failures are logged out-of-band instead of propagating to the
//! caller. To keep a crash-looping deployment from flooding the log sink, at
//! most one notification per logical key (or "general") is emitted per
//! notification-TTL window; the throttle state lives in the same expiring
//! cache as the secrets themselves.

use crate::cache::ExpiringCache;
use crate::clock::Clock;
use crate::config::SecretsConfig;
use crate::error::{Result, SecretsError};
use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Key tag used when a failure is not attributable to a single secret.
const GENERAL_KEY: &str = "general";

/// RFC 5424 severity levels accepted by the `severity-level` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Informational,
    Debug,
}

impl Severity {
    /// Parse a configured severity level string.
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "emergency" => Ok(Self::Emergency),
            "alert" => Ok(Self::Alert),
            "critical" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "notice" => Ok(Self::Notice),
            "informational" | "info" => Ok(Self::Informational),
            "debug" => Ok(Self::Debug),
            other => Err(SecretsError::config(format!(
                "'{}' is not an RFC 5424 severity level",
                other
            ))),
        }
    }

    /// Label normalized for log usage ("informational" becomes "info").
    pub fn normalized(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Informational => "info",
            Self::Debug => "debug",
        }
    }

    /// Emit a message at this severity through the tracing sink.
    ///
    /// tracing has no levels above error; emergency, alert, and critical all
    /// land on the error level with the original severity kept as a field.
    fn log(&self, message: &str) {
        let severity = self.normalized();
        match self {
            Self::Emergency | Self::Alert | Self::Critical | Self::Error => {
                tracing::error!(severity = severity, "{}", message)
            }
            Self::Warning => tracing::warn!(severity = severity, "{}", message),
            Self::Notice | Self::Informational => {
                tracing::info!(severity = severity, "{}", message)
            }
            Self::Debug => tracing::debug!(severity = severity, "{}", message),
        }
    }
}

/// Side channel for retrieval failures, throttled per logical key.
#[derive(Debug)]
pub struct FailureNotifier {
    cache: Arc<dyn ExpiringCache>,
    clock: Arc<dyn Clock>,
    severity: Severity,
    key_prefix: String,
    project_tag: String,
    env_tag: String,
    window: Duration,
}

impl FailureNotifier {
    /// Build a notifier from the resolved configuration.
    pub fn new(
        cache: Arc<dyn ExpiringCache>,
        clock: Arc<dyn Clock>,
        config: &SecretsConfig,
    ) -> Result<Self> {
        Ok(Self {
            cache,
            clock,
            severity: Severity::parse(&config.severity_level)?,
            key_prefix: config.notification_cache_key_prefix.clone(),
            project_tag: config.project_tag.clone(),
            env_tag: config.env_tag(),
            window: config.notification_interval()?,
        })
    }

    fn cache_key(&self, key_tag: &str) -> String {
        format!("{}-{}-{}", self.key_prefix, self.project_tag, key_tag)
    }

    /// Report a retrieval failure for a logical key, or a general failure
    /// when no single key is responsible.
    ///
    /// Within one notification window per key, only the first report is
    /// logged; the rest are dropped entirely.
    pub async fn notify(&self, reason: &str, key: Option<&str>) {
        let key_tag = key.unwrap_or(GENERAL_KEY);

        let message = match key {
            Some(key) => format!(
                "Could not retrieve external secret data for key '{}' for project '{}' on environment '{}' - {}",
                key, self.project_tag, self.env_tag, reason
            ),
            None => format!(
                "Could not retrieve external secret data for project '{}' on environment '{}' - {}",
                self.project_tag, self.env_tag, reason
            ),
        };

        // set_if_absent doubles as the presence check, so two concurrent
        // reports cannot both win the window.
        let expires_at = self.clock.now() + self.window;
        let sent = self
            .cache
            .set_if_absent(&self.cache_key(key_tag), Value::String("sent".to_string()), expires_at)
            .await;

        if !sent {
            debug!(key = %key_tag, "Failure notification suppressed inside throttle window");
            return;
        }

        self.severity.log(&message);
    }
}
