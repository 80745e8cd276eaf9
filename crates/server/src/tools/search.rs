//! verse_search tool implementation.
//!
//! Scans cached translations only. Unlike the surah tools this never falls
//! back to the origin, so an unwarmed or unreachable cache is an error.

use mushaf_core::SearchResult;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::context::Services;

/// Parameters for the verse_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerseSearchParams {
    /// Words that must all appear in the translation. At least 3 characters.
    pub query: String,
}

/// Output from the verse_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerseSearchOutput {
    pub query: String,
    pub total: usize,
    pub results: Vec<SearchResult>,
}

/// Implementation of the verse_search tool.
pub async fn search_impl<S>(services: &Services<S>, params: VerseSearchParams) -> Result<CallToolResult, McpError> {
    let results = services.scanner.search(&params.query).await?;
    json_result(&VerseSearchOutput { query: params.query, total: results.len(), results })
}
