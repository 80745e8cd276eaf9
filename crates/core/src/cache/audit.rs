//! Collection completeness audit.
//!
//! Read-only: probes which documents of the fixed collection are cached,
//! one batch of concurrent probes at a time. Probes decode into
//! [`IgnoredAny`], so a document counts as present only if its JSON is valid,
//! and no document is ever materialized.

use chrono::Utc;
use futures::future::join_all;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::keys::Collection;
use super::repository::DEFAULT_BATCH_SIZE;
use super::store::CacheStore;

/// Which documents are missing from cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CompletenessReport {
    pub is_complete: bool,
    /// Missing ids, ascending.
    pub missing_ids: Vec<u32>,
    pub checked_at: String,
}

impl CompletenessReport {
    fn from_missing(missing_ids: Vec<u32>) -> Self {
        Self { is_complete: missing_ids.is_empty(), missing_ids, checked_at: Utc::now().to_rfc3339() }
    }

    pub fn missing_count(&self) -> usize {
        self.missing_ids.len()
    }
}

/// Presence of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ProbeReport {
    pub id: u32,
    pub exists: bool,
    pub cache_key: String,
}

#[derive(Debug, Clone)]
pub struct CompletenessAuditor {
    store: CacheStore,
    collection: Collection,
    batch_size: usize,
}

impl CompletenessAuditor {
    pub fn new(store: CacheStore, collection: Collection) -> Self {
        Self { store, collection, batch_size: DEFAULT_BATCH_SIZE }
    }

    /// Probes in flight at once.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Report every missing id of the collection.
    ///
    /// An unreachable cache or an absent index reports the whole collection
    /// as missing, since neither can be told apart from an empty cache.
    pub async fn check_collection_complete(&self) -> CompletenessReport {
        let all: Vec<u32> = self.collection.ids().collect();

        if !self.store.is_available().await {
            tracing::warn!(namespace = self.collection.namespace(), "cache unavailable, reporting collection missing");
            return CompletenessReport::from_missing(all);
        }

        let index_key = self.collection.index_key();
        if self.store.get::<IgnoredAny>(&index_key).await.is_none() {
            tracing::info!(key = %index_key, "collection index absent, reporting collection missing");
            return CompletenessReport::from_missing(all);
        }

        let mut missing = Vec::new();
        for batch in all.chunks(self.batch_size) {
            let probes = join_all(batch.iter().map(|&id| self.exists(id))).await;
            missing.extend(batch.iter().zip(probes).filter(|(_, exists)| !exists).map(|(&id, _)| id));
        }

        let report = CompletenessReport::from_missing(missing);
        tracing::info!(
            namespace = self.collection.namespace(),
            is_complete = report.is_complete,
            missing = report.missing_count(),
            "collection audit finished"
        );
        report
    }

    /// Whether one document is cached.
    pub async fn probe(&self, id: u32) -> ProbeReport {
        ProbeReport { id, exists: self.exists(id).await, cache_key: self.collection.item_key(id) }
    }

    async fn exists(&self, id: u32) -> bool {
        self.store.get::<IgnoredAny>(&self.collection.item_key(id)).await.is_some()
    }
}
