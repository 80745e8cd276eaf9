//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Cache URL schemes the service can connect to.
const CACHE_SCHEMES: [&str; 3] = ["redis", "rediss", "memory"];

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_url` has no scheme or one other than redis, rediss, memory
    /// - `namespace` is empty or contains glob metacharacters
    /// - `collection_size` or `batch_size` is 0
    /// - `ready_poll_ms` is 0 or longer than `ready_timeout_ms`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `origin_base_url` does not parse
    /// - `document_ttl_secs` is set to 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.cache_url.split_once("://") {
            Some((scheme, _)) if CACHE_SCHEMES.contains(&scheme) => {}
            Some((scheme, _)) => {
                return Err(invalid("cache_url", format!("unsupported scheme '{scheme}'")));
            }
            None => return Err(invalid("cache_url", "must be a URL such as redis://host:6379")),
        }

        if self.namespace.is_empty() {
            return Err(invalid("namespace", "must not be empty"));
        }
        if self.namespace.contains(['*', '?', '[', ']']) {
            return Err(invalid("namespace", "must not contain glob characters"));
        }

        if self.collection_size == 0 {
            return Err(invalid("collection_size", "must be greater than 0"));
        }

        if self.ready_poll_ms == 0 {
            return Err(invalid("ready_poll_ms", "must be greater than 0"));
        }
        if self.ready_poll_ms > self.ready_timeout_ms {
            return Err(invalid("ready_poll_ms", "must not exceed ready_timeout_ms"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be greater than 0"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if let Err(e) = url::Url::parse(&self.origin_base_url) {
            return Err(invalid("origin_base_url", e.to_string()));
        }

        if self.document_ttl_secs == Some(0) {
            return Err(invalid("document_ttl_secs", "must be greater than 0 when set"));
        }

        Ok(())
    }
}
