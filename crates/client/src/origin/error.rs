//! Origin API client error types.

use std::sync::Arc;

/// Errors from the origin document API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OriginError {
    /// Chapter id outside the collection.
    #[error("invalid chapter id {id}: must be 1-{max}")]
    InvalidId { id: u32, max: u32 },

    /// The origin has no such chapter.
    #[error("chapter {0} not found at origin")]
    NotFound(u32),

    /// HTTP error response, or a non-success envelope code.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// The origin answered with a different chapter than requested.
    #[error("origin returned chapter {returned} for request {requested}")]
    Mismatch { requested: u32, returned: u32 },
}

impl From<reqwest::Error> for OriginError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { OriginError::Timeout } else { OriginError::Network(Arc::new(err)) }
    }
}

impl From<OriginError> for mushaf_core::Error {
    fn from(err: OriginError) -> Self {
        match err {
            OriginError::InvalidId { .. } => mushaf_core::Error::InvalidInput(err.to_string()),
            other => mushaf_core::Error::Origin(other.to_string()),
        }
    }
}
