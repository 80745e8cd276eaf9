//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MUSHAF_*)
//! 2. TOML config file (if MUSHAF_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{COLLECTION_SIZE, Collection, ConnectionSettings, DEFAULT_NAMESPACE};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MUSHAF_*)
/// 2. TOML config file (if MUSHAF_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cache server URL. `memory://` selects the in-process store.
    ///
    /// Set via MUSHAF_CACHE_URL environment variable.
    #[serde(default = "default_cache_url")]
    pub cache_url: String,

    /// Key namespace prefix for every cache key.
    ///
    /// Set via MUSHAF_NAMESPACE environment variable.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Number of documents in the collection; ids run 1..=collection_size.
    #[serde(default = "default_collection_size")]
    pub collection_size: u32,

    /// How long a cache operation waits for the connection to become ready.
    ///
    /// Set via MUSHAF_READY_TIMEOUT_MS environment variable.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Liveness probe interval while waiting for readiness.
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_ms: u64,

    /// Bound on a single cache connect attempt.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Per-request retries inside the Redis connection manager.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Cap on any single reconnect delay.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Expiry for cached documents. Unset means cached forever.
    ///
    /// Set via MUSHAF_DOCUMENT_TTL_SECS environment variable.
    #[serde(default)]
    pub document_ttl_secs: Option<u64>,

    /// Base URL of the origin document API.
    ///
    /// Set via MUSHAF_ORIGIN_BASE_URL environment variable.
    #[serde(default = "default_origin_base_url")]
    pub origin_base_url: String,

    /// User-Agent string for origin requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Origin request timeout in milliseconds.
    ///
    /// Set via MUSHAF_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Concurrent fetches or probes per batch during warm-up and audit.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_cache_url() -> String {
    "redis://127.0.0.1:6379".into()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}

fn default_collection_size() -> u32 {
    COLLECTION_SIZE
}

fn default_ready_timeout_ms() -> u64 {
    5_000
}

fn default_ready_poll_ms() -> u64 {
    100
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> usize {
    3
}

fn default_max_backoff_ms() -> u64 {
    3_000
}

fn default_origin_base_url() -> String {
    "https://equran.id/api/v2".into()
}

fn default_user_agent() -> String {
    "mushaf/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_batch_size() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_url: default_cache_url(),
            namespace: default_namespace(),
            collection_size: default_collection_size(),
            ready_timeout_ms: default_ready_timeout_ms(),
            ready_poll_ms: default_ready_poll_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_retries: default_max_retries(),
            max_backoff_ms: default_max_backoff_ms(),
            document_ttl_secs: None,
            origin_base_url: default_origin_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            batch_size: default_batch_size(),
        }
    }
}

impl AppConfig {
    /// Origin timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Connection manager timings derived from this configuration.
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            ready_timeout: self.ready_timeout(),
            poll_interval: Duration::from_millis(self.ready_poll_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            max_retries: self.max_retries,
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            ..ConnectionSettings::default()
        }
    }

    pub fn collection(&self) -> Collection {
        Collection::new(self.namespace.clone(), self.collection_size)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MUSHAF_`
    /// 2. TOML file from `MUSHAF_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MUSHAF_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MUSHAF_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
