//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the cache manager.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, list_impl, purge_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};
use crate::tools::push::{SwNotificationClickParams, SwPushParams, click_impl, push_impl};
use crate::tools::sw_fetch::{SwFetchParams, fetch_impl};

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
use swcache_worker::CacheManager;

/// The main MCP server handler for swcache-host.
#[derive(Clone)]
pub struct SwcacheServer {
    tool_router: ToolRouter<Self>,
    manager: Arc<CacheManager>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SwcacheServer {
    /// Create a new server handler around a shared manager.
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self { tool_router: Self::tool_router(), manager }
    }

    /// Run the install event: precache the manifest into the current bucket.
    #[tool(description = "Install the worker: fetch every precache URL and store it in the current bucket. All or nothing.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.manager).await
    }

    /// Run the activate event: drop old buckets and claim clients.
    #[tool(description = "Activate the worker: delete every bucket except the current one and claim open clients.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.manager).await
    }

    /// Intercept a request the way a page fetch would be.
    #[tool(
        description = "Route a request through the worker. Returns the strategy used, where the response came from, and the body."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.manager, params.0).await
    }

    #[tool(description = "Deliver a push message. The payload is JSON text with title, body and optional url.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.manager, params.0).await
    }

    #[tool(description = "Click a notification: focus a window already on its url, or open a new one.")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        click_impl(&self.manager, params.0).await
    }

    #[tool(description = "List cache buckets with entry counts and the current worker state.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.manager).await
    }

    #[tool(description = "Read the entry stored for a URL in the current bucket.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.manager, params.0).await
    }

    #[tool(description = "Delete a bucket by name. The current bucket needs force=true.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.manager, params.0).await
    }
}

impl ServerHandler for SwcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache-host".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
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
