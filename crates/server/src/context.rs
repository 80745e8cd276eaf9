//! Service wiring.
//!
//! Builds the single [`ConnectionManager`] and every cache component on top of
//! it from the loaded configuration.

use std::sync::Arc;

use mushaf_client::{OriginClient, OriginConfig, OriginError};
use mushaf_core::cache::open_connector;
use mushaf_core::{
    AppConfig, CacheAsideRepository, CacheStore, Collection, CompletenessAuditor, ConnectionManager, SearchScanner,
};

/// Everything a tool call may need, sharing one cache connection.
pub struct Services<S> {
    pub manager: ConnectionManager,
    pub store: CacheStore,
    pub repository: CacheAsideRepository,
    pub auditor: CompletenessAuditor,
    pub scanner: SearchScanner,
    pub source: Arc<S>,
}

impl<S> Clone for Services<S> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            store: self.store.clone(),
            repository: self.repository.clone(),
            auditor: self.auditor.clone(),
            scanner: self.scanner.clone(),
            source: self.source.clone(),
        }
    }
}

impl<S> Services<S> {
    /// Wire the cache components around an existing origin.
    ///
    /// No connection is attempted here; the first cache operation starts it.
    pub fn with_source(config: &AppConfig, source: Arc<S>) -> Self {
        let settings = config.connection_settings();
        let manager = ConnectionManager::new(open_connector(&config.cache_url, settings.clone()), settings);
        let store = CacheStore::new(manager.clone());
        let collection = config.collection();

        let repository = CacheAsideRepository::new(store.clone(), collection.clone())
            .with_ttl(config.document_ttl_secs)
            .with_batch_size(config.batch_size);
        let auditor = CompletenessAuditor::new(store.clone(), collection.clone()).with_batch_size(config.batch_size);
        let scanner = SearchScanner::new(store.clone(), collection);

        Self { manager, store, repository, auditor, scanner, source }
    }

    pub fn collection(&self) -> &Collection {
        self.repository.collection()
    }
}

impl Services<OriginClient> {
    /// Wire the services against the configured origin API.
    pub fn from_config(config: &AppConfig) -> Result<Self, OriginError> {
        let origin = OriginClient::new(OriginConfig::from(config))?;
        Ok(Self::with_source(config, Arc::new(origin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mushaf_core::ConnectionState;

    #[tokio::test]
    async fn test_services_share_one_connection() {
        let config = AppConfig { cache_url: "memory://".into(), collection_size: 5, ..Default::default() };
        let services = Services::from_config(&config).unwrap();

        assert_eq!(services.manager.state(), ConnectionState::Disconnected);
        services.store.set("surah:index", &Vec::<u32>::new(), None).await;
        assert!(services.manager.is_ready());
        assert!(services.store.manager().is_ready());
        assert_eq!(services.collection().size(), 5);

        services.manager.shutdown().await;
        assert_eq!(services.store.manager().state(), ConnectionState::Disconnected);
    }
}
