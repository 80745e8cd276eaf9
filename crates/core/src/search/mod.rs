//! Multi-term AND search over cached verse translations.
//!
//! A verse matches when every query term is a case-insensitive substring of
//! its translation. There is no word-boundary check, so `iman` also matches
//! inside `keimanan`. Results are unranked and returned in document-id then
//! verse order.

pub mod scanner;
pub mod text;

pub use scanner::SearchScanner;
pub use text::{Highlighter, MIN_QUERY_CHARS, matches_all, tokenize};
