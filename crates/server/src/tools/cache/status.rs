//! cache_status and cache_probe tool implementations.

use mushaf_core::ConnectionState;
use mushaf_core::cache::ProbeReport;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::context::Services;
use crate::tools::{check_id, json_result};

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheStatusOutput {
    /// Connection state when the audit finished.
    pub connection: ConnectionState,
    pub is_complete: bool,
    pub missing_count: usize,
    pub missing_ids: Vec<u32>,
    pub checked_at: String,
}

/// Parameters for the cache_probe tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheProbeParams {
    /// Chapter number, 1-114.
    pub id: u32,
}

/// Implementation of the cache_status tool.
pub async fn status_impl<S>(services: &Services<S>) -> Result<CallToolResult, McpError> {
    let report = services.auditor.check_collection_complete().await;

    json_result(&CacheStatusOutput {
        connection: services.manager.state(),
        is_complete: report.is_complete,
        missing_count: report.missing_count(),
        missing_ids: report.missing_ids,
        checked_at: report.checked_at,
    })
}

/// Implementation of the cache_probe tool.
pub async fn probe_impl<S>(services: &Services<S>, params: CacheProbeParams) -> Result<CallToolResult, McpError> {
    check_id(services.collection(), params.id)?;
    let report: ProbeReport = services.auditor.probe(params.id).await;
    json_result(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubOrigin, output, services};
    use serde_json::Value;

    #[tokio::test]
    async fn test_status_of_cold_cache() {
        let services = services(StubOrigin::default());

        let status: Value = output(&status_impl(&services).await.unwrap());
        assert_eq!(status["is_complete"], false);
        assert_eq!(status["missing_count"], 5);
        assert_eq!(status["connection"], "ready");
    }

    #[tokio::test]
    async fn test_status_after_partial_warm() {
        let origin = StubOrigin { missing: [2, 5].into(), ..Default::default() };
        let services = services(origin);
        services.repository.warm(services.source.as_ref()).await.unwrap();

        let status: Value = output(&status_impl(&services).await.unwrap());
        assert_eq!(status["is_complete"], false);
        assert_eq!(status["missing_ids"], serde_json::json!([2, 5]));
    }

    #[tokio::test]
    async fn test_probe() {
        let services = services(StubOrigin::default());
        services.repository.document(3, services.source.as_ref()).await.unwrap();

        let probe: ProbeReport = output(&probe_impl(&services, CacheProbeParams { id: 3 }).await.unwrap());
        assert!(probe.exists);
        assert_eq!(probe.cache_key, "surah:item:3");

        let probe: ProbeReport = output(&probe_impl(&services, CacheProbeParams { id: 4 }).await.unwrap());
        assert!(!probe.exists);
    }

    #[tokio::test]
    async fn test_probe_rejects_out_of_range_id() {
        let services = services(StubOrigin::default());
        let err = probe_impl(&services, CacheProbeParams { id: 0 }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
