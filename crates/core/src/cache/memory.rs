//! Process-local cache backend.
//!
//! Selected by a `memory://` cache URL. Entries live in a map guarded by an
//! async mutex; expiry is checked lazily on read using the tokio clock, so
//! paused-time tests can drive it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use super::CacheError;
use super::client::{CacheClient, Connector};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory key-value store implementing [`CacheClient`].
#[derive(Debug, Default)]
pub struct MemoryClient {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().await.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheClient for MemoryClient {
    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<(), CacheError> {
        let expires_at = ttl_seconds.map(|ttl| Instant::now() + Duration::from_secs(ttl));
        self.entries
            .lock()
            .await
            .insert(key.to_string(), MemoryEntry { value, expires_at });
        Ok(())
    }

    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let matcher = glob::Pattern::new(pattern)
            .map_err(|e| CacheError::Command(format!("invalid pattern {pattern:?}: {e}")))?;
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .await
            .iter()
            .filter(|(key, entry)| entry.is_live(now) && matcher.matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }

    async fn del(&self, keys: &[String]) -> Result<u64, CacheError> {
        let mut entries = self.entries.lock().await;
        let deleted = keys.iter().filter(|key| entries.remove(key.as_str()).is_some()).count();
        Ok(deleted as u64)
    }

    async fn close(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Hands out one shared [`MemoryClient`].
///
/// Every connect returns the same store, so data survives reconnects and
/// callers holding the store can seed or inspect it.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    store: Arc<MemoryClient>,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryClient>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<MemoryClient> {
        self.store.clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn CacheClient>, CacheError> {
        Ok(self.store.clone())
    }

    fn target(&self) -> String {
        "memory://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let client = MemoryClient::new();
        client.set("surah:index", "[]".into(), None).await.unwrap();
        assert_eq!(client.get("surah:index").await.unwrap().as_deref(), Some("[]"));
        assert!(client.get("surah:item:1").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let client = MemoryClient::new();
        client.set("short", "1".into(), Some(1)).await.unwrap();
        client.set("forever", "2".into(), None).await.unwrap();

        assert!(client.get("short").await.unwrap().is_some());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(client.get("short").await.unwrap().is_none());
        assert!(client.get("forever").await.unwrap().is_some());
        assert_eq!(client.len().await, 1);
    }

    #[tokio::test]
    async fn test_scan_match_glob() {
        let client = MemoryClient::new();
        for key in ["surah:index", "surah:item:1", "surah:item:2", "other:item:1"] {
            client.set(key, "{}".into(), None).await.unwrap();
        }

        let keys = client.scan_match("surah:item:*").await.unwrap();
        assert_eq!(keys, vec!["surah:item:1".to_string(), "surah:item:2".to_string()]);
    }

    #[tokio::test]
    async fn test_del_counts_existing_keys() {
        let client = MemoryClient::new();
        client.set("a", "1".into(), None).await.unwrap();
        client.set("b", "2".into(), None).await.unwrap();

        let deleted = client.del(&["a".into(), "missing".into()]).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(client.len().await, 1);
    }

    #[tokio::test]
    async fn test_connector_shares_store() {
        let connector = MemoryConnector::default();
        let first = connector.connect().await.unwrap();
        first.set("k", "v".into(), None).await.unwrap();

        let second = connector.connect().await.unwrap();
        assert_eq!(second.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(!connector.store().is_empty().await);
    }
}
