//! Typed cache-layer failures.
//!
//! These are returned by the `try_*` operations of the cache store and by the
//! readiness gate. The public best-effort operations log them and degrade to a
//! miss or a no-op.

use std::time::Duration;

/// Errors from the cache client and the readiness gate.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Readiness gate exceeded its wait budget.
    #[error("connection timeout: cache not ready after {0:?}")]
    ConnectionTimeout(Duration),

    /// The connection left the ready state between the gate and the command.
    #[error("connection not ready")]
    NotReady,

    /// Network or protocol failure from the underlying client.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server rejected a command on a healthy connection (wrong type,
    /// bad argument, undecodable reply).
    #[error("command rejected: {0}")]
    Command(String),

    /// Value could not be (de)serialized.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CacheError {
    /// Whether the failure came from the connection rather than the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, CacheError::Transport(_))
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        use redis::ErrorKind;

        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            return CacheError::Transport(err.to_string());
        }
        match err.kind() {
            ErrorKind::TypeError | ErrorKind::ResponseError | ErrorKind::ExtensionError => {
                CacheError::Command(err.to_string())
            }
            _ => CacheError::Transport(err.to_string()),
        }
    }
}
