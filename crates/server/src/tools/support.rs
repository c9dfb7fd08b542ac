//! Shared fixtures for tool tests.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use swcache_core::{AppConfig, CacheDb, Error, Request, Response};
use swcache_worker::{CacheManager, ManagerConfig, Network};

use crate::host::StdioHost;

/// Answers 200 for every path except the ones listed as missing.
pub struct SiteNetwork {
    missing: HashSet<String>,
}

#[async_trait]
impl Network for SiteNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let path = request.url.path();
        if self.missing.contains(path) || path.starts_with("/nowhere") {
            return Ok(Response::text(404, "not found"));
        }
        Ok(Response::html(200, format!("<p>{path}</p>")))
    }
}

pub async fn manager_with_missing(missing: &str) -> CacheManager {
    build([missing.to_string()].into_iter().collect()).await
}

pub async fn manager() -> CacheManager {
    build(HashSet::new()).await
}

async fn build(missing: HashSet<String>) -> CacheManager {
    let db = CacheDb::open_in_memory().await.unwrap();
    let config = ManagerConfig::from_app(&AppConfig::default()).unwrap();
    CacheManager::new(config, Arc::new(db), Arc::new(SiteNetwork { missing }), Arc::new(StdioHost::default()))
}

/// Text of the first content block of a tool result.
pub fn text_of(result: &CallToolResult) -> String {
    let value = serde_json::to_value(&result.content[0]).unwrap();
    value
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content")
        .to_string()
}
