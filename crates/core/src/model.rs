//! Document, verse, and search result types.
//!
//! `Document` and `DocumentSummary` are the cached wire format shared with
//! every other consumer of the cache, so their JSON field names are camelCase
//! and must stay stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary entry of the collection index (one per chapter, no verses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: u32,
    pub name: String,
    pub latin_name: String,
    pub verse_count: u32,
    #[serde(default)]
    pub revelation_place: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub description: String,
    /// Full-chapter recitation keyed by reciter id.
    #[serde(default)]
    pub audio_full: BTreeMap<String, String>,
}

/// A full chapter with its ordered verses.
///
/// Immutable once fetched from the origin; cached as one serialized blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: u32,
    pub name: String,
    pub latin_name: String,
    pub verse_count: u32,
    #[serde(default)]
    pub revelation_place: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub audio_full: BTreeMap<String, String>,
    pub verses: Vec<Verse>,
}

impl Document {
    /// The index entry describing this document.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            name: self.name.clone(),
            latin_name: self.latin_name.clone(),
            verse_count: self.verse_count,
            revelation_place: self.revelation_place.clone(),
            meaning: self.meaning.clone(),
            description: self.description.clone(),
            audio_full: self.audio_full.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub number: u32,
    pub arabic_text: String,
    pub latin_text: String,
    /// The searched field.
    pub translation_text: String,
    #[serde(default)]
    pub audio_urls: BTreeMap<String, String>,
}

/// One matching verse. Computed per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchResult {
    pub document_id: u32,
    pub document_name: String,
    pub document_latin_name: String,
    pub verse_number: u32,
    pub verse_text: String,
    pub highlighted_snippet: String,
}
