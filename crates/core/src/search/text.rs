//! Query tokenization, matching, and snippet highlighting.

use regex::{Regex, RegexBuilder};

/// Shortest accepted query, in characters after trimming.
pub const MIN_QUERY_CHARS: usize = 3;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// Lowercase the query and split it on whitespace runs.
pub fn tokenize(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_owned).collect()
}

/// Whether `text` contains every term, ignoring case.
///
/// Terms must already be lowercase (see [`tokenize`]).
pub fn matches_all(text: &str, terms: &[String]) -> bool {
    let haystack = text.to_lowercase();
    terms.iter().all(|term| haystack.contains(term.as_str()))
}

/// Wraps every case-insensitive occurrence of each term in `<mark>` tags.
///
/// Terms are applied in order, each over the output of the previous one, so a
/// later term may wrap text inside an earlier mark.
#[derive(Debug, Clone)]
pub struct Highlighter {
    patterns: Vec<Regex>,
}

impl Highlighter {
    pub fn new(terms: &[String]) -> Self {
        let patterns = terms
            .iter()
            .filter_map(|term| {
                RegexBuilder::new(&regex::escape(term))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| tracing::warn!(term = %term, error = %e, "term cannot be highlighted"))
                    .ok()
            })
            .collect();
        Self { patterns }
    }

    pub fn apply(&self, text: &str) -> String {
        let replacement = format!("{MARK_OPEN}$0{MARK_CLOSE}");
        self.patterns.iter().fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, replacement.as_str()).into_owned()
        })
    }
}
