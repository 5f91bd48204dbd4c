//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_SECS, DEFAULT_BACKOFF_MIN_SECS, DEFAULT_DEFAULTS_REQUEUE_SECS,
    DEFAULT_MAX_CONCURRENT_RECONCILIATIONS, DEFAULT_METRICS_PORT,
    DEFAULT_TERMINATING_REQUEUE_SECS,
};
use std::time::Duration;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Port of the metrics and probe server
    pub metrics_port: u16,
    /// Namespace to watch; all namespaces when `None`
    pub watch_namespace: Option<String>,
    /// Maximum registries reconciled at the same time.
    /// One identity is never reconciled twice concurrently regardless of this value.
    pub max_concurrent_reconciliations: u16,
    /// Soft-retry delay while the storage type is still unset (seconds)
    pub defaults_requeue_secs: u64,
    /// Delay before re-checking children that are still terminating (seconds)
    pub terminating_requeue_secs: u64,
    /// Error backoff floor (seconds)
    pub backoff_min_secs: u64,
    /// Error backoff ceiling (seconds)
    pub backoff_max_secs: u64,
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            watch_namespace: None,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            defaults_requeue_secs: DEFAULT_DEFAULTS_REQUEUE_SECS,
            terminating_requeue_secs: DEFAULT_TERMINATING_REQUEUE_SECS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            log_format: LogFormat::Text,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str, default| {
            lookup(key)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(default)
        };

        let backoff_min_secs = parsed("BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS).max(1);
        let backoff_max_secs =
            parsed("BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS).max(backoff_min_secs);

        Self {
            metrics_port: lookup("METRICS_PORT")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(DEFAULT_METRICS_PORT),
            watch_namespace: lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty()),
            max_concurrent_reconciliations: lookup("MAX_CONCURRENT_RECONCILIATIONS")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_CONCURRENT_RECONCILIATIONS),
            defaults_requeue_secs: parsed("DEFAULTS_REQUEUE_SECS", DEFAULT_DEFAULTS_REQUEUE_SECS),
            terminating_requeue_secs: parsed(
                "TERMINATING_REQUEUE_SECS",
                DEFAULT_TERMINATING_REQUEUE_SECS,
            ),
            backoff_min_secs,
            backoff_max_secs,
            log_format: lookup("LOG_FORMAT")
                .map_or(LogFormat::Text, |value| LogFormat::parse(&value)),
        }
    }

    /// Get soft-retry duration used while storage defaults are missing
    #[must_use]
    pub fn defaults_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.defaults_requeue_secs)
    }

    /// Get delay before re-checking terminating children
    #[must_use]
    pub fn terminating_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.terminating_requeue_secs)
    }
}
