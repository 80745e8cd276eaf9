//! Cache key namespace for the chapter collection.
//!
//! `{namespace}:index` holds the summary list, `{namespace}:item:{id}` one
//! full document. Ids are rendered without leading zeros.

use std::ops::RangeInclusive;

/// Number of chapters in the collection.
pub const COLLECTION_SIZE: u32 = 114;

/// Default key namespace.
pub const DEFAULT_NAMESPACE: &str = "surah";

/// A fixed-size collection and the keys it is cached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    namespace: String,
    size: u32,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, COLLECTION_SIZE)
    }
}

impl Collection {
    pub fn new(namespace: impl Into<String>, size: u32) -> Self {
        Self { namespace: namespace.into(), size }
    }

    /// Prefix shared by every key of the collection.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of documents; ids run `1..=size`.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Ids of every document, ascending.
    pub fn ids(&self) -> RangeInclusive<u32> {
        1..=self.size
    }

    /// Whether `id` names a document of the collection.
    pub fn contains(&self, id: u32) -> bool {
        self.ids().contains(&id)
    }

    /// Key of the summary list; its presence marks a completed warm-up.
    pub fn index_key(&self) -> String {
        format!("{}:index", self.namespace)
    }

    /// Key of one full document.
    pub fn item_key(&self, id: u32) -> String {
        format!("{}:item:{id}", self.namespace)
    }

    /// Glob matching every document key.
    pub fn item_pattern(&self) -> String {
        format!("{}:item:*", self.namespace)
    }
}
