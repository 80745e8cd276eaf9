//! Redis backend.
//!
//! Wraps `redis::aio::ConnectionManager`, which multiplexes every command over
//! one connection and reconnects on its own with exponential backoff.
//! Pattern resolution uses `SCAN` cursors and never `KEYS`.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager as RedisManager, ConnectionManagerConfig};
use tokio::sync::RwLock;

use super::client::{CacheClient, Connector};
use super::connection::ConnectionSettings;
use super::CacheError;

/// Keys requested per `SCAN` round trip.
const SCAN_COUNT: usize = 100;

/// Connects to a Redis server by URL.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    url: String,
    settings: ConnectionSettings,
}

impl RedisConnector {
    pub fn new(url: impl Into<String>, settings: ConnectionSettings) -> Self {
        Self { url: url.into(), settings }
    }

    fn manager_config(&self) -> ConnectionManagerConfig {
        ConnectionManagerConfig::new()
            .set_number_of_retries(self.settings.max_retries)
            .set_exponent_base(2)
            .set_max_delay(self.settings.max_backoff.as_millis() as u64)
            .set_connection_timeout(self.settings.connect_timeout)
    }
}

#[async_trait]
impl Connector for RedisConnector {
    async fn connect(&self) -> Result<Arc<dyn CacheClient>, CacheError> {
        let client = redis::Client::open(self.url.as_str())?;
        let manager = RedisManager::new_with_config(client, self.manager_config()).await?;
        Ok(Arc::new(RedisClient { conn: RwLock::new(Some(manager)) }))
    }

    fn target(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(parsed) => format!(
                "{}://{}:{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or("localhost"),
                parsed.port().unwrap_or(6379)
            ),
            Err(_) => "redis://<invalid>".to_string(),
        }
    }
}

/// A connected Redis client.
pub struct RedisClient {
    conn: RwLock<Option<RedisManager>>,
}

impl RedisClient {
    /// Clone of the multiplexed handle; fails once the client was closed.
    async fn handle(&self) -> Result<RedisManager, CacheError> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| CacheError::Transport("connection closed".to_string()))
    }
}

#[async_trait]
impl CacheClient for RedisClient {
    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.handle().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.handle().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<(), CacheError> {
        let mut conn = self.handle().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl_seconds {
            cmd.arg("EX").arg(ttl);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.handle().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once across iterations.
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    async fn del(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.handle().await?;
        let deleted: u64 = conn.del(keys).await?;
        Ok(deleted)
    }

    async fn close(&self) -> Result<(), CacheError> {
        // Dropping the last handle closes the multiplexed connection.
        self.conn.write().await.take();
        Ok(())
    }
}
