//! Cache-aside access to chapter documents.
//!
//! Every document read goes through [`CacheAsideRepository::get_or_fetch`]:
//! serve from cache on a hit, otherwise call the origin once, populate the
//! cache best-effort, and return the origin value.

use std::future::Future;

use async_trait::async_trait;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::keys::Collection;
use super::store::CacheStore;
use crate::model::{Document, DocumentSummary};

/// Default number of documents fetched concurrently during warm-up.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// The slow origin the cache sits in front of.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Summary list of the whole collection.
    async fn fetch_index(&self) -> Result<Vec<DocumentSummary>, Self::Error>;

    /// One full document by id.
    async fn fetch_document(&self, id: u32) -> Result<Document, Self::Error>;
}

/// Outcome of a collection warm-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WarmReport {
    /// Entries in the cached index.
    pub index_entries: usize,
    /// Documents now served (from cache or freshly fetched).
    pub documents_ready: usize,
    /// Ids whose origin fetch failed, ascending.
    pub failed_ids: Vec<u32>,
}

impl WarmReport {
    pub fn is_complete(&self) -> bool {
        self.failed_ids.is_empty()
    }
}

/// Get-or-populate over the cache store.
#[derive(Debug, Clone)]
pub struct CacheAsideRepository {
    store: CacheStore,
    collection: Collection,
    ttl_seconds: Option<u64>,
    batch_size: usize,
}

impl CacheAsideRepository {
    pub fn new(store: CacheStore, collection: Collection) -> Self {
        Self { store, collection, ttl_seconds: None, batch_size: DEFAULT_BATCH_SIZE }
    }

    /// Expiry applied to documents cached by the typed helpers.
    pub fn with_ttl(mut self, ttl_seconds: Option<u64>) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Documents fetched concurrently per warm-up batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The collection this repository reads and warms.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Return the cached value for `key`, or fetch it from `origin` and cache it.
    ///
    /// The origin is called at most once and only on a miss. Origin errors
    /// are returned unchanged; cache failures never are.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, origin: F, ttl_seconds: Option<u64>) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.store.get::<T>(key).await {
            tracing::debug!(key, "cache hit");
            return Ok(cached);
        }

        tracing::debug!(key, "cache miss, fetching from origin");
        let value = origin().await?;
        self.store.set(key, &value, ttl_seconds).await;
        Ok(value)
    }

    /// The collection index.
    pub async fn index<S>(&self, source: &S) -> Result<Vec<DocumentSummary>, S::Error>
    where
        S: DocumentSource + ?Sized,
    {
        let key = self.collection.index_key();
        self.get_or_fetch(&key, || source.fetch_index(), self.ttl_seconds).await
    }

    /// One document by id.
    pub async fn document<S>(&self, id: u32, source: &S) -> Result<Document, S::Error>
    where
        S: DocumentSource + ?Sized,
    {
        let key = self.collection.item_key(id);
        self.get_or_fetch(&key, || source.fetch_document(id), self.ttl_seconds).await
    }

    /// Populate the index and every document of the collection.
    ///
    /// Documents are loaded in sequential batches, concurrently within a
    /// batch. A failing document is recorded and skipped; a failing index
    /// aborts the warm-up.
    pub async fn warm<S>(&self, source: &S) -> Result<WarmReport, S::Error>
    where
        S: DocumentSource + ?Sized,
    {
        let index = self.index(source).await?;
        let ids: Vec<u32> = self.collection.ids().collect();

        let mut documents_ready = 0;
        let mut failed_ids = Vec::new();
        for batch in ids.chunks(self.batch_size) {
            let outcomes = join_all(batch.iter().map(|&id| self.document(id, source))).await;
            for (&id, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(_) => documents_ready += 1,
                    Err(e) => {
                        tracing::warn!(id, error = %e, "warm-up could not load document");
                        failed_ids.push(id);
                    }
                }
            }
        }

        tracing::info!(
            index_entries = index.len(),
            documents_ready,
            failed = failed_ids.len(),
            "collection warm-up finished"
        );
        Ok(WarmReport { index_entries: index.len(), documents_ready, failed_ids })
    }
}
