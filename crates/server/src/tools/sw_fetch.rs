//! sw_fetch tool implementation.
//!
//! Routes a request through the manager the way a page fetch would be
//! intercepted. Passthrough requests go straight to the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{Request, RequestMode, Response};
use swcache_worker::{CacheManager, FetchOutcome, fetch::resolve};

use super::json_result;
use crate::error::HostError;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL or a root-relative path on the site origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Treat the request as a page navigation.
    #[serde(default)]
    pub navigate: bool,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    /// Strategy tag, absent for passthrough requests.
    pub strategy: Option<String>,
    /// "cache", "network", "fallback" or "passthrough".
    pub source: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: usize,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

impl SwFetchOutput {
    fn new(url: String, strategy: Option<String>, source: String, response: &Response) -> Self {
        Self {
            url,
            strategy,
            source,
            status: response.status,
            content_type: response.content_type.clone(),
            bytes: response.body.len(),
            body: response.text_body(),
        }
    }
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(manager: &CacheManager, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(HostError::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(HostError::InvalidInput("method cannot be empty".into()).into());
    }

    let url = resolve(&manager.config().origin, &params.url)
        .map_err(|e| HostError::InvalidInput(format!("invalid url {}: {e}", params.url)))?;
    let mode = if params.navigate { RequestMode::Navigate } else { RequestMode::SameOrigin };
    let request = Request::new(params.method.trim(), url, mode);
    let url = request.url.to_string();

    let output = match manager.on_fetch(request.clone()).await {
        FetchOutcome::Respond { strategy, source, response } => {
            SwFetchOutput::new(url, Some(strategy.to_string()), source.as_str().into(), &response)
        }
        FetchOutcome::Passthrough => {
            let response = manager.network().fetch(&request).await?;
            SwFetchOutput::new(url, None, "passthrough".into(), &response)
        }
    };

    json_result(&output)
}
