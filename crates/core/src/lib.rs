//! Core of the mushaf service: a Redis-backed read-through cache over the
//! 114 chapters of the Quran, plus verse search over the cached copies.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod search;

pub use cache::{
    CacheAsideRepository, CacheStore, Collection, CompletenessAuditor, ConnectionManager, ConnectionState,
    DocumentSource,
};
pub use config::AppConfig;
pub use error::Error;
pub use model::{Document, DocumentSummary, SearchResult, Verse};
pub use search::SearchScanner;
