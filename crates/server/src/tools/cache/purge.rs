//! cache_purge tool implementation.
//!
//! Deletes a whole bucket. The current bucket is protected unless forced.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::CacheManager;

use crate::error::HostError;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Bucket to delete.
    pub bucket: String,

    /// Allow deleting the bucket the current version serves from.
    #[serde(default)]
    pub force: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub deleted: String,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(manager: &CacheManager, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.bucket.is_empty() {
        return Err(HostError::InvalidInput("bucket cannot be empty".into()).into());
    }
    if params.bucket == manager.cache_name() && !params.force {
        return Err(HostError::InvalidInput(format!(
            "{} is the current bucket; pass force=true to delete it",
            params.bucket
        ))
        .into());
    }

    if !manager.storage().delete_bucket(&params.bucket).await? {
        return Err(HostError::BucketNotFound(params.bucket).into());
    }
    tracing::info!(bucket = %params.bucket, "purged bucket");

    json_result(&CachePurgeOutput { deleted: params.bucket })
}
