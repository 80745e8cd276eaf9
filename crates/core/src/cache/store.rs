//! Typed, best-effort cache operations.
//!
//! Every operation passes the readiness gate first. The `try_*` variants
//! return the typed [`CacheError`]; the plain variants log it and degrade to a
//! miss or a no-op, so a cache outage never aborts the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::CacheError;
use super::client::CacheClient;
use super::connection::ConnectionManager;

/// Upper bound on keys per delete command.
pub const INVALIDATE_BATCH_SIZE: usize = 100;

/// Get/set/delete over the shared connection.
#[derive(Debug, Clone)]
pub struct CacheStore {
    manager: ConnectionManager,
    ready_timeout: Duration,
}

impl CacheStore {
    pub fn new(manager: ConnectionManager) -> Self {
        let ready_timeout = manager.settings().ready_timeout;
        Self { manager, ready_timeout }
    }

    /// Override the readiness wait budget used by every operation.
    pub fn with_ready_timeout(mut self, ready_timeout: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    async fn ready_client(&self) -> Result<Arc<dyn CacheClient>, CacheError> {
        self.manager.await_ready(self.ready_timeout).await?;
        self.manager.client().await.ok_or(CacheError::NotReady)
    }

    /// Feed transport failures back into the connection state.
    fn observe<T>(&self, result: Result<T, CacheError>) -> Result<T, CacheError> {
        if let Err(e) = &result
            && e.is_transport()
        {
            self.manager.report_transport_error();
        }
        result
    }

    /// Read and deserialize a value.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let client = self.ready_client().await?;
        match self.observe(client.get(key).await)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Read a value, treating any failure as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache get failed, treating as miss");
                None
            }
        }
    }

    /// Serialize and write a value, with an expiry only when `ttl_seconds` is given.
    ///
    /// Refuses with [`CacheError::NotReady`] when the connection is not ready
    /// at call time.
    pub async fn try_set<T: Serialize + ?Sized>(
        &self, key: &str, value: &T, ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        let client = self.ready_client().await?;
        self.write_if_ready(client.as_ref(), key, value, ttl_seconds).await
    }

    async fn write_if_ready<T: Serialize + ?Sized>(
        &self, client: &dyn CacheClient, key: &str, value: &T, ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        if !self.manager.is_ready() {
            return Err(CacheError::NotReady);
        }
        let json = serde_json::to_string(value)?;
        self.observe(client.set(key, json, ttl_seconds).await)
    }

    /// Write a value; failures are logged and dropped.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) {
        match self.try_set(key, value, ttl_seconds).await {
            Ok(()) => tracing::debug!(key, ttl_seconds, "cached value"),
            Err(e) => tracing::warn!(key, error = %e, "cache set skipped"),
        }
    }

    /// Delete every key matching a glob pattern, in batches.
    ///
    /// A batch failing after earlier batches went through stops the run and
    /// reports the keys already deleted; only a failure before any deletion
    /// is an error.
    pub async fn try_invalidate(&self, pattern: &str) -> Result<u64, CacheError> {
        let client = self.ready_client().await?;
        let keys = self.observe(client.scan_match(pattern).await)?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut deleted = 0;
        for batch in keys.chunks(INVALIDATE_BATCH_SIZE) {
            match self.observe(client.del(batch).await) {
                Ok(count) => deleted += count,
                Err(e) if deleted == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(pattern, deleted, matched = keys.len(), error = %e, "cache invalidation stopped partway");
                    break;
                }
            }
        }
        Ok(deleted)
    }

    /// Delete every key matching a glob pattern, returning how many went away.
    ///
    /// Degrades to 0 on failure.
    pub async fn invalidate(&self, pattern: &str) -> u64 {
        match self.try_invalidate(pattern).await {
            Ok(deleted) => {
                tracing::info!(pattern, deleted, "cache invalidated");
                deleted
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "cache invalidation skipped");
                0
            }
        }
    }

    /// Whether the cache can serve commands, waiting up to the ready timeout.
    pub async fn is_available(&self) -> bool {
        self.manager.is_ready() || self.manager.await_ready(self.ready_timeout).await.is_ok()
    }
}
