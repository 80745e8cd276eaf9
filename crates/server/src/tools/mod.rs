//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mushaf server. Each tool is
//! a free function over [`Services`](crate::context::Services) so it can be
//! exercised without a transport.

pub mod cache;
pub mod search;
pub mod surah;

#[cfg(test)]
pub(crate) mod testing;

use mushaf_core::{Collection, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Serialize a tool output as pretty JSON text content.
pub fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Reject chapter ids outside the collection.
pub fn check_id(collection: &Collection, id: u32) -> Result<(), Error> {
    if collection.contains(id) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("chapter id {id} out of range 1-{}", collection.size())))
    }
}
