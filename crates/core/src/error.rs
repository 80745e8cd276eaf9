//! Unified error types for mushaf.
//!
//! Only failures a caller can act on live here. Cache-layer failures are
//! absorbed by [`crate::cache::CacheStore`] and never reach this type, except
//! for the hard preconditions of verse search.

use std::time::Duration;

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::cache::CacheError;

/// Unified error types for the mushaf server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a chapter id out of range).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The origin document API failed; the data is genuinely unavailable.
    #[error("ORIGIN_ERROR: {0}")]
    Origin(String),

    /// The cache service is unreachable and the operation has no fallback.
    #[error("SERVICE_UNAVAILABLE: cache service is not available")]
    ServiceUnavailable,

    /// The collection index key is absent, so the collection was never warmed.
    #[error("SEARCH_INDEX_UNAVAILABLE: collection index {0} is not cached")]
    SearchIndexUnavailable(String),

    /// The readiness gate exceeded its wait budget.
    #[error("CONNECTION_TIMEOUT: cache not ready after {0:?}")]
    ConnectionTimeout(Duration),

    /// A cache failure surfaced through an explicit, non-degrading call.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::ConnectionTimeout(waited) => Error::ConnectionTimeout(waited),
            other => Error::Cache(other.to_string()),
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Origin(msg) => (-32000, msg.clone()),
            Error::ServiceUnavailable => (-32001, err.to_string()),
            Error::SearchIndexUnavailable(_) => (-32002, err.to_string()),
            Error::ConnectionTimeout(_) => (-32003, err.to_string()),
            Error::Cache(msg) => (-32004, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
