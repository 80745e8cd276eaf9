//! Full-collection verse scan.
//!
//! Search never falls back to the origin: scanning every document over the
//! origin API is too slow, so a missing cache is a hard failure here.

use futures::future::join_all;
use serde::de::IgnoredAny;

use super::text::{Highlighter, MIN_QUERY_CHARS, matches_all, tokenize};
use crate::Error;
use crate::cache::{CacheStore, Collection};
use crate::model::{Document, SearchResult};

#[derive(Debug, Clone)]
pub struct SearchScanner {
    store: CacheStore,
    collection: Collection,
}

impl SearchScanner {
    pub fn new(store: CacheStore, collection: Collection) -> Self {
        Self { store, collection }
    }

    /// Every verse whose translation contains all query terms.
    ///
    /// Queries shorter than three characters return nothing without touching
    /// the cache. Fails with [`Error::ServiceUnavailable`] when the cache is
    /// down and [`Error::SearchIndexUnavailable`] when the collection was
    /// never warmed.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, Error> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        let terms = tokenize(query);

        if !self.store.is_available().await {
            return Err(Error::ServiceUnavailable);
        }

        let index_key = self.collection.index_key();
        if self.store.get::<IgnoredAny>(&index_key).await.is_none() {
            return Err(Error::SearchIndexUnavailable(index_key));
        }

        // One fetch per document, all in flight together; join_all keeps id order.
        let documents = join_all(self.collection.ids().map(|id| self.load(id))).await;

        let highlighter = Highlighter::new(&terms);
        let results: Vec<SearchResult> = documents
            .iter()
            .flatten()
            .flat_map(|doc| scan_document(doc, &terms, &highlighter))
            .collect();

        tracing::info!(query, terms = terms.len(), matches = results.len(), "verse search finished");
        Ok(results)
    }

    async fn load(&self, id: u32) -> Option<Document> {
        match self.store.try_get::<Document>(&self.collection.item_key(id)).await {
            Ok(Some(doc)) => Some(doc),
            Ok(None) => {
                tracing::warn!(id, "document not cached, skipped by search");
                None
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "document unreadable, skipped by search");
                None
            }
        }
    }
}

fn scan_document(doc: &Document, terms: &[String], highlighter: &Highlighter) -> Vec<SearchResult> {
    doc.verses
        .iter()
        .filter(|verse| matches_all(&verse.translation_text, terms))
        .map(|verse| SearchResult {
            document_id: doc.id,
            document_name: doc.name.clone(),
            document_latin_name: doc.latin_name.clone(),
            verse_number: verse.number,
            verse_text: verse.translation_text.clone(),
            highlighted_snippet: highlighter.apply(&verse.translation_text),
        })
        .collect()
}
