//! surah_list and surah_get tool implementations.
//!
//! Both read through the cache: a hit never reaches the origin, a miss
//! fetches once and populates the cache.

use mushaf_core::cache::DocumentSource;
use mushaf_core::{Document, DocumentSummary, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{check_id, json_result};
use crate::context::Services;

/// Parameters for the surah_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SurahGetParams {
    /// Chapter number, 1-114.
    pub id: u32,
}

/// Output from the surah_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SurahListOutput {
    pub total: usize,
    pub surahs: Vec<DocumentSummary>,
}

/// Output from the surah_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SurahGetOutput {
    pub surah: Document,
}

/// Implementation of the surah_list tool.
pub async fn list_impl<S>(services: &Services<S>) -> Result<CallToolResult, McpError>
where
    S: DocumentSource,
    S::Error: Into<Error>,
{
    let surahs = services.repository.index(services.source.as_ref()).await.map_err(Into::<Error>::into)?;
    json_result(&SurahListOutput { total: surahs.len(), surahs })
}

/// Implementation of the surah_get tool.
pub async fn get_impl<S>(services: &Services<S>, params: SurahGetParams) -> Result<CallToolResult, McpError>
where
    S: DocumentSource,
    S::Error: Into<Error>,
{
    check_id(services.collection(), params.id)?;

    let surah = services
        .repository
        .document(params.id, services.source.as_ref())
        .await
        .map_err(Into::<Error>::into)?;
    json_result(&SurahGetOutput { surah })
}
