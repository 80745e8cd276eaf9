//! Read-through cache in front of the chapter origin.
//!
//! Layers, bottom-up:
//!
//! - [`client`]: the [`CacheClient`] seam with Redis and in-memory backends
//! - [`connection`]: lifecycle and readiness gate for the shared client
//! - [`store`]: typed get/set/invalidate that degrade instead of failing
//! - [`repository`]: cache-aside reads and collection warm-up
//! - [`audit`]: read-only completeness checks

pub mod audit;
pub mod client;
pub mod connection;
pub mod error;
pub mod keys;
pub mod memory;
pub mod redis_client;
pub mod repository;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use audit::{CompletenessAuditor, CompletenessReport, ProbeReport};
pub use client::{CacheClient, Connector};
pub use connection::{ConnectionManager, ConnectionSettings, ConnectionState};
pub use error::CacheError;
pub use keys::{COLLECTION_SIZE, Collection, DEFAULT_NAMESPACE};
pub use memory::{MemoryClient, MemoryConnector};
pub use redis_client::{RedisClient, RedisConnector};
pub use repository::{CacheAsideRepository, DocumentSource, WarmReport};
pub use store::CacheStore;

/// Scheme selecting the in-process backend.
pub const MEMORY_SCHEME: &str = "memory";

/// Pick a backend from the cache URL scheme.
///
/// `memory://` selects the in-process store; anything else is handed to Redis.
pub fn open_connector(url: &str, settings: ConnectionSettings) -> Arc<dyn Connector> {
    if url.starts_with(&format!("{MEMORY_SCHEME}://")) {
        Arc::new(MemoryConnector::default())
    } else {
        Arc::new(RedisConnector::new(url, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_connector_by_scheme() {
        let settings = ConnectionSettings::default();
        assert_eq!(open_connector("memory://", settings.clone()).target(), "memory://");
        assert_eq!(
            open_connector("redis://:secret@cache.internal:6380/0", settings).target(),
            "redis://cache.internal:6380"
        );
    }
}
