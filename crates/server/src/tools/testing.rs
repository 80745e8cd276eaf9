//! Test fixtures for tool implementations.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mushaf_client::OriginError;
use mushaf_core::cache::DocumentSource;
use mushaf_core::{AppConfig, Document, DocumentSummary, Verse};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;

use crate::context::Services;

pub const TEST_COLLECTION_SIZE: u32 = 5;

/// A small in-process origin with per-id failures.
#[derive(Debug, Default)]
pub struct StubOrigin {
    pub document_calls: AtomicUsize,
    pub missing: HashSet<u32>,
}

impl StubOrigin {
    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }
}

pub fn document(id: u32) -> Document {
    Document {
        id,
        name: format!("سورة {id}"),
        latin_name: format!("Surah {id}"),
        verse_count: 2,
        revelation_place: "Mekah".into(),
        meaning: String::new(),
        description: String::new(),
        audio_full: BTreeMap::new(),
        verses: vec![
            Verse {
                number: 1,
                arabic_text: String::new(),
                latin_text: String::new(),
                translation_text: format!("Dengan nama Allah, surah {id}"),
                audio_urls: BTreeMap::new(),
            },
            Verse {
                number: 2,
                arabic_text: String::new(),
                latin_text: String::new(),
                translation_text: "Segala puji bagi Allah, Tuhan semesta alam".into(),
                audio_urls: BTreeMap::new(),
            },
        ],
    }
}

#[async_trait]
impl DocumentSource for StubOrigin {
    type Error = OriginError;

    async fn fetch_index(&self) -> Result<Vec<DocumentSummary>, OriginError> {
        Ok((1..=TEST_COLLECTION_SIZE).map(|id| document(id).summary()).collect())
    }

    async fn fetch_document(&self, id: u32) -> Result<Document, OriginError> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.contains(&id) {
            return Err(OriginError::NotFound(id));
        }
        Ok(document(id))
    }
}

/// Services over a fresh in-memory cache and a stub origin.
pub fn services(origin: StubOrigin) -> Services<StubOrigin> {
    let config = AppConfig {
        cache_url: "memory://".into(),
        collection_size: TEST_COLLECTION_SIZE,
        ready_timeout_ms: 500,
        ready_poll_ms: 10,
        ..Default::default()
    };
    Services::with_source(&config, Arc::new(origin))
}

/// Decode the JSON text content of a tool result.
pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
