//! cache_get tool implementation.
//!
//! Retrieves the entry stored for a URL in the current bucket.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{Error, Request};
use swcache_worker::{CacheManager, fetch::resolve};

use crate::error::HostError;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL or root-relative path of the cached request.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub bucket: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: std::collections::BTreeMap<String, String>,
    pub bytes: usize,
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(manager: &CacheManager, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&manager.config().origin, &params.url)
        .map_err(|e| HostError::InvalidInput(format!("invalid url {}: {e}", params.url)))?;
    let request = Request::get(url);

    let response = manager
        .storage()
        .match_entry(manager.cache_name(), &request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.url.to_string()))?;

    let output = CacheGetOutput {
        bucket: manager.cache_name().to_string(),
        url: request.cache_url(),
        status: response.status,
        content_type: response.content_type.clone(),
        headers: response.headers.clone(),
        bytes: response.body.len(),
        body: response.text_body(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::support::{manager, text_of};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let manager = manager().await;
        let params = CacheGetParams { url: "/never.css".to_string() };

        let err = get_impl(&manager, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let manager = manager().await;
        manager.on_install().await.unwrap();

        let result = get_impl(&manager, CacheGetParams { url: "/offline.html".into() }).await.unwrap();
        let output: CacheGetOutput = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(output.url, "http://localhost:8080/offline.html");
        assert_eq!(output.status, 200);
        assert_eq!(output.body, "<p>/offline.html</p>");
    }
}
