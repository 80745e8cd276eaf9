//! Fault-injecting cache fakes for unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::client::{CacheClient, Connector};
use super::connection::{ConnectionManager, ConnectionSettings};
use super::memory::MemoryClient;
use super::repository::DocumentSource;
use super::store::CacheStore;
use super::CacheError;
use crate::model::{Document, DocumentSummary, Verse};

fn injected(op: &str) -> CacheError {
    CacheError::Transport(format!("injected {op} failure"))
}

/// A [`MemoryClient`] with switchable failures and call counters.
#[derive(Debug, Default)]
pub struct FlakyClient {
    inner: MemoryClient,
    fail_ping: AtomicBool,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_close: AtomicBool,
    failing_keys: Mutex<HashSet<String>>,
    rejected_keys: Mutex<HashSet<String>>,
    del_limit: Mutex<Option<usize>>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    dels: AtomicUsize,
    closes: AtomicUsize,
}

impl FlakyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_ping(&self, on: bool) {
        self.fail_ping.store(on, Ordering::SeqCst);
    }

    pub fn fail_get(&self, on: bool) {
        self.fail_get.store(on, Ordering::SeqCst);
    }

    pub fn fail_set(&self, on: bool) {
        self.fail_set.store(on, Ordering::SeqCst);
    }

    pub fn fail_close(&self, on: bool) {
        self.fail_close.store(on, Ordering::SeqCst);
    }

    /// Make reads of one key fail with a transport error.
    pub fn fail_key(&self, key: &str) {
        if let Ok(mut keys) = self.failing_keys.lock() {
            keys.insert(key.to_string());
        }
    }

    /// Make reads of one key fail the way a server rejects a command.
    pub fn reject_key(&self, key: &str) {
        if let Ok(mut keys) = self.rejected_keys.lock() {
            keys.insert(key.to_string());
        }
    }

    /// Let `calls` delete commands succeed, then fail every later one.
    pub fn fail_del_after(&self, calls: usize) {
        if let Ok(mut limit) = self.del_limit.lock() {
            *limit = Some(calls);
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn dels(&self) -> usize {
        self.dels.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Write straight to the backing store, bypassing counters and failures.
    pub async fn seed(&self, key: &str, value: impl Into<String>) {
        let _ = self.inner.set(key, value.into(), None).await;
    }

    pub async fn seed_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        let json = serde_json::to_string(value).unwrap_or_default();
        self.seed(key, json).await;
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }

    fn key_fails(&self, key: &str) -> bool {
        self.failing_keys.lock().map(|keys| keys.contains(key)).unwrap_or(false)
    }

    fn key_rejected(&self, key: &str) -> bool {
        self.rejected_keys.lock().map(|keys| keys.contains(key)).unwrap_or(false)
    }
}

#[async_trait]
impl CacheClient for FlakyClient {
    async fn ping(&self) -> Result<(), CacheError> {
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(injected("ping"));
        }
        self.inner.ping().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) || self.key_fails(key) {
            return Err(injected("get"));
        }
        if self.key_rejected(key) {
            return Err(CacheError::Command("WRONGTYPE Operation against a key holding the wrong kind of value".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(injected("set"));
        }
        self.inner.set(key, value, ttl_seconds).await
    }

    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        self.inner.scan_match(pattern).await
    }

    async fn del(&self, keys: &[String]) -> Result<u64, CacheError> {
        let call = self.dels.fetch_add(1, Ordering::SeqCst);
        if self.del_limit.lock().map(|limit| limit.is_some_and(|n| call >= n)).unwrap_or(false) {
            return Err(injected("del"));
        }
        self.inner.del(keys).await
    }

    async fn close(&self) -> Result<(), CacheError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(injected("close"));
        }
        Ok(())
    }
}

/// A [`MemoryClient`] whose reads take a while, recording how many overlap.
#[derive(Debug)]
pub struct SlowClient {
    inner: MemoryClient,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowClient {
    pub fn new(delay: Duration) -> Self {
        Self { inner: MemoryClient::new(), delay, in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
    }

    /// Most reads ever in flight at once.
    pub fn peak_gets(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub async fn seed_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        let json = serde_json::to_string(value).unwrap_or_default();
        let _ = self.inner.set(key, json, None).await;
    }
}

#[async_trait]
impl CacheClient for SlowClient {
    async fn ping(&self) -> Result<(), CacheError> {
        self.inner.ping().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl_seconds).await
    }

    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        self.inner.scan_match(pattern).await
    }

    async fn del(&self, keys: &[String]) -> Result<u64, CacheError> {
        self.inner.del(keys).await
    }

    async fn close(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Always hands out the same client.
pub struct StaticConnector {
    client: Arc<dyn CacheClient>,
}

impl StaticConnector {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Connector for StaticConnector {
    async fn connect(&self) -> Result<Arc<dyn CacheClient>, CacheError> {
        Ok(self.client.clone())
    }

    fn target(&self) -> String {
        "static://test".to_string()
    }
}

/// Never connects.
#[derive(Debug, Default)]
pub struct FailingConnector {
    attempts: AtomicUsize,
}

impl FailingConnector {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self) -> Result<Arc<dyn CacheClient>, CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Transport("connection refused".to_string()))
    }

    fn target(&self) -> String {
        "redis://unreachable:6379".to_string()
    }
}

/// Settings with short waits so degraded paths finish quickly.
pub fn fast_settings() -> ConnectionSettings {
    ConnectionSettings {
        ready_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        connect_timeout: Duration::from_millis(100),
        base_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        ..Default::default()
    }
}

/// A store over a fresh [`FlakyClient`], returning both.
pub fn flaky_store() -> (CacheStore, Arc<FlakyClient>) {
    let client = Arc::new(FlakyClient::new());
    let manager = ConnectionManager::new(Arc::new(StaticConnector::new(client.clone())), fast_settings());
    (CacheStore::new(manager), client)
}

/// A store over a [`SlowClient`], returning both.
pub fn slow_store(delay: Duration) -> (CacheStore, Arc<SlowClient>) {
    let client = Arc::new(SlowClient::new(delay));
    let manager = ConnectionManager::new(Arc::new(StaticConnector::new(client.clone())), fast_settings());
    (CacheStore::new(manager), client)
}

/// A store whose connection never becomes ready.
pub fn unavailable_store() -> CacheStore {
    let manager = ConnectionManager::new(Arc::new(FailingConnector::default()), fast_settings());
    CacheStore::new(manager)
}

#[derive(Debug, thiserror::Error)]
#[error("origin unavailable: {0}")]
pub struct FakeOriginError(pub String);

pub fn make_document(id: u32, translations: &[&str]) -> Document {
    Document {
        id,
        name: format!("سورة {id}"),
        latin_name: format!("Surah {id}"),
        verse_count: translations.len() as u32,
        revelation_place: "Mekah".into(),
        meaning: String::new(),
        description: String::new(),
        audio_full: BTreeMap::new(),
        verses: translations
            .iter()
            .enumerate()
            .map(|(i, text)| Verse {
                number: i as u32 + 1,
                arabic_text: String::new(),
                latin_text: String::new(),
                translation_text: text.to_string(),
                audio_urls: BTreeMap::new(),
            })
            .collect(),
    }
}

/// Origin with call counting and per-id failures.
#[derive(Debug, Default)]
pub struct FakeSource {
    pub size: u32,
    pub index_calls: AtomicUsize,
    pub document_calls: AtomicUsize,
    pub failing: Mutex<HashSet<u32>>,
    pub fail_index: bool,
}

impl FakeSource {
    pub fn new(size: u32) -> Self {
        Self { size, ..Default::default() }
    }

    pub fn failing_on(self, ids: &[u32]) -> Self {
        if let Ok(mut failing) = self.failing.lock() {
            failing.extend(ids);
        }
        self
    }
}

#[async_trait]
impl DocumentSource for FakeSource {
    type Error = FakeOriginError;

    async fn fetch_index(&self) -> Result<Vec<DocumentSummary>, FakeOriginError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_index {
            return Err(FakeOriginError("index".into()));
        }
        Ok((1..=self.size).map(|id| make_document(id, &[]).summary()).collect())
    }

    async fn fetch_document(&self, id: u32) -> Result<Document, FakeOriginError> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().map(|f| f.contains(&id)).unwrap_or(false) {
            return Err(FakeOriginError(format!("document {id}")));
        }
        Ok(make_document(id, &["Dengan nama Allah"]))
    }
}
