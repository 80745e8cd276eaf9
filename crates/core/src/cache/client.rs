//! Cache client abstraction.
//!
//! The connection manager only ever talks to a [`CacheClient`] built by a
//! [`Connector`], so the Redis backend can be swapped for the in-memory one
//! without touching any higher component.

use std::sync::Arc;

use async_trait::async_trait;

use super::CacheError;

/// A connected key-value cache.
///
/// Values are opaque serialized strings; typing happens in the cache store.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Lightweight liveness probe.
    async fn ping(&self) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value, expiring it after `ttl_seconds` when given.
    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<(), CacheError>;

    /// Resolve every key matching a glob pattern.
    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, CacheError>;

    /// Delete the given keys, returning how many existed.
    async fn del(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<(), CacheError>;
}

/// Builds a [`CacheClient`], performing the transport connect and handshake.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn CacheClient>, CacheError>;

    /// Human-readable target for logs (never includes credentials).
    fn target(&self) -> String;
}
