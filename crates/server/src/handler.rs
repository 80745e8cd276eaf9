//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use mushaf_client::OriginClient;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::context::Services;
use crate::tools::cache::{CacheInvalidateParams, CacheProbeParams, invalidate_impl, probe_impl, status_impl, warm_impl};
use crate::tools::search::{VerseSearchParams, search_impl};
use crate::tools::surah::{SurahGetParams, get_impl, list_impl};

/// The main MCP server handler for mushaf.
#[derive(Clone)]
pub struct MushafServer {
    services: Services<OriginClient>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl MushafServer {
    /// Create a new server handler.
    pub fn new(services: Services<OriginClient>) -> Self {
        Self { services, tool_router: Self::tool_router() }
    }

    #[tool(description = "List all 114 chapters (number, Arabic and Latin names, verse count, place of revelation).")]
    async fn surah_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.services).await
    }

    #[tool(description = "Get one chapter with all its verses: Arabic text, transliteration, and Indonesian translation.")]
    async fn surah_get(&self, params: Parameters<SurahGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.services, params.0).await
    }

    /// Full scan of the cached translations; requires a warmed cache.
    #[tool(
        description = "Search verse translations. Every query word must appear in the verse (case-insensitive). Queries under 3 characters return no results. Requires cache_warm to have run."
    )]
    async fn verse_search(&self, params: Parameters<VerseSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.services, params.0).await
    }

    #[tool(description = "Report the cache connection state and which chapters are missing from cache.")]
    async fn cache_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.services).await
    }

    #[tool(description = "Check whether a single chapter is cached.")]
    async fn cache_probe(&self, params: Parameters<CacheProbeParams>) -> Result<CallToolResult, McpError> {
        probe_impl(&self.services, params.0).await
    }

    #[tool(description = "Delete cached entries matching a glob pattern within the namespace. Returns the number deleted.")]
    async fn cache_invalidate(&self, params: Parameters<CacheInvalidateParams>) -> Result<CallToolResult, McpError> {
        invalidate_impl(&self.services, params.0).await
    }

    #[tool(description = "Load the chapter index and every chapter into the cache. Chapters already cached are skipped.")]
    async fn cache_warm(&self) -> Result<CallToolResult, McpError> {
        warm_impl(&self.services).await
    }
}

impl ServerHandler for MushafServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mushaf".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Quran chapters and verses served through a read-through cache. Run cache_warm before verse_search."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
