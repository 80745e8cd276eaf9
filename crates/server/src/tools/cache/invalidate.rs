//! cache_invalidate tool implementation.
//!
//! Deletes cache entries by glob pattern. Patterns are confined to the
//! service namespace so a typo cannot wipe unrelated keys.

use mushaf_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::context::Services;
use crate::tools::json_result;

/// Parameters for the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateParams {
    /// Glob pattern inside the namespace, e.g. `surah:item:*`.
    /// Defaults to every key of the namespace.
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Output from the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateOutput {
    pub pattern: String,
    /// Number of keys deleted.
    pub deleted: u64,
}

/// Implementation of the cache_invalidate tool.
pub async fn invalidate_impl<S>(
    services: &Services<S>, params: CacheInvalidateParams,
) -> Result<CallToolResult, McpError> {
    let prefix = format!("{}:", services.collection().namespace());
    let pattern = match params.pattern {
        Some(p) if p.trim().is_empty() => {
            return Err(Error::InvalidInput("pattern must not be empty".to_string()).into());
        }
        Some(p) if !p.starts_with(&prefix) => {
            return Err(Error::InvalidInput(format!("pattern must start with '{prefix}'")).into());
        }
        Some(p) => p,
        None => format!("{prefix}*"),
    };

    let deleted = services.store.invalidate(&pattern).await;
    json_result(&CacheInvalidateOutput { pattern, deleted })
}
