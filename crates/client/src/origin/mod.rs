//! Origin document API client.
//!
//! Fetches the chapter index and individual chapters from the public Quran
//! API. This is the slow source the cache sits in front of; it is only ever
//! called on a cache miss or during warm-up.
//!
//! ### Endpoints
//!
//! - `GET {base}/surat`: every chapter, without verses
//! - `GET {base}/surat/{id}`: one chapter with verses

pub mod error;
pub mod response;

pub use error::OriginError;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mushaf_core::cache::{COLLECTION_SIZE, DocumentSource};
use mushaf_core::{AppConfig, Document, DocumentSummary};
use reqwest::{StatusCode, header};

/// Default base URL for the origin API.
const DEFAULT_BASE_URL: &str = "https://equran.id/api/v2";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "mushaf/0.1";

/// Origin client configuration.
#[derive(Debug, Clone)]
pub struct OriginConfig {
    /// Base URL (default: https://equran.id/api/v2).
    pub base_url: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    pub user_agent: String,
    /// Highest valid chapter id.
    pub collection_size: u32,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            collection_size: COLLECTION_SIZE,
        }
    }
}

impl From<&AppConfig> for OriginConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.origin_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            collection_size: config.collection_size,
        }
    }
}

/// HTTP client for the origin API.
#[derive(Debug, Clone)]
pub struct OriginClient {
    http: reqwest::Client,
    config: OriginConfig,
}

impl OriginClient {
    pub fn new(config: OriginConfig) -> Result<Self, OriginError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OriginConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn check_id(&self, id: u32) -> Result<(), OriginError> {
        if id == 0 || id > self.config.collection_size {
            return Err(OriginError::InvalidId { id, max: self.config.collection_size });
        }
        Ok(())
    }

    /// GET a path and return the body, mapping HTTP failures.
    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, OriginError> {
        let url = self.endpoint(path);
        let start = Instant::now();

        let response = self.http.get(&url).header(header::ACCEPT, "application/json").send().await?;
        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "origin responded");

        if status.is_client_error() || status.is_server_error() {
            return Err(OriginError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(url = %url, bytes = bytes.len(), elapsed_ms = start.elapsed().as_millis() as u64, "origin body read");
        Ok(bytes.to_vec())
    }

    /// The chapter index.
    pub async fn fetch_index(&self) -> Result<Vec<DocumentSummary>, OriginError> {
        let bytes = self.get_bytes("surat").await?;
        let index = response::parse_index(&bytes)?;
        tracing::info!(entries = index.len(), "fetched chapter index from origin");
        Ok(index)
    }

    /// One chapter with all its verses.
    pub async fn fetch_document(&self, id: u32) -> Result<Document, OriginError> {
        self.check_id(id)?;
        let bytes = match self.get_bytes(&format!("surat/{id}")).await {
            Err(OriginError::HttpError { status }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(OriginError::NotFound(id));
            }
            other => other?,
        };
        let document = response::parse_document(&bytes, id)?;
        tracing::info!(id, verses = document.verses.len(), "fetched chapter from origin");
        Ok(document)
    }
}

#[async_trait]
impl DocumentSource for OriginClient {
    type Error = OriginError;

    async fn fetch_index(&self) -> Result<Vec<DocumentSummary>, OriginError> {
        OriginClient::fetch_index(self).await
    }

    async fn fetch_document(&self, id: u32) -> Result<Document, OriginError> {
        OriginClient::fetch_document(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OriginClient {
        OriginClient::new(OriginConfig::default()).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = OriginConfig::default();
        assert_eq!(config.base_url, "https://equran.id/api/v2");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.collection_size, 114);
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig {
            origin_base_url: "http://localhost:9000/api".into(),
            timeout_ms: 1_500,
            collection_size: 5,
            ..Default::default()
        };
        let config = OriginConfig::from(&app);
        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.timeout, Duration::from_millis(1_500));
        assert_eq!(config.collection_size, 5);
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let with_slash =
            OriginClient::new(OriginConfig { base_url: "https://equran.id/api/v2/".into(), ..Default::default() })
                .unwrap();
        assert_eq!(with_slash.endpoint("surat/1"), "https://equran.id/api/v2/surat/1");
        assert_eq!(client().endpoint("surat"), "https://equran.id/api/v2/surat");
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_ids_without_request() {
        let client = client();
        for id in [0, 115, u32::MAX] {
            let result = client.fetch_document(id).await;
            assert!(matches!(result, Err(OriginError::InvalidId { max: 114, .. })), "{id}");
        }
    }

    #[test]
    fn test_accepts_collection_bounds() {
        let client = client();
        assert!(client.check_id(1).is_ok());
        assert!(client.check_id(114).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_network_error() {
        let client = OriginClient::new(OriginConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let result = client.fetch_index().await;
        assert!(matches!(result, Err(OriginError::Network(_) | OriginError::Timeout)));
    }
}
