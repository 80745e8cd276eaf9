//! cache_warm tool implementation.
//!
//! Loads the index and every chapter into the cache so that verse search can
//! run. Chapters already cached are not fetched again.

use mushaf_core::Error;
use mushaf_core::cache::{DocumentSource, WarmReport};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::context::Services;
use crate::tools::json_result;

/// Output from the cache_warm tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheWarmOutput {
    #[serde(flatten)]
    pub report: WarmReport,
    pub is_complete: bool,
}

/// Implementation of the cache_warm tool.
pub async fn warm_impl<S>(services: &Services<S>) -> Result<CallToolResult, McpError>
where
    S: DocumentSource,
    S::Error: Into<Error>,
{
    let report = services.repository.warm(services.source.as_ref()).await.map_err(Into::<Error>::into)?;
    json_result(&CacheWarmOutput { is_complete: report.is_complete(), report })
}
