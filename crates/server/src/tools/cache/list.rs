//! cache_list tool implementation.
//!
//! Lists every bucket with its entry count and marks the current one.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::BucketInfo;
use swcache_worker::CacheManager;

use crate::tools::json_result;

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Name of the bucket this version serves from.
    pub current: String,
    /// Lifecycle state of the worker.
    pub state: String,
    pub buckets: Vec<BucketInfo>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(manager: &CacheManager) -> Result<CallToolResult, McpError> {
    let buckets = manager.storage().bucket_info().await?;
    let state = format!("{:?}", manager.state().await).to_lowercase();
    let output = CacheListOutput { current: manager.cache_name().to_string(), state, buckets };
    json_result(&output)
}
