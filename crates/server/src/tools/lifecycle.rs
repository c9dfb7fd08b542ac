//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use swcache_worker::CacheManager;

use super::json_result;

/// Precache the manifest into the current bucket.
pub async fn install_impl(manager: &CacheManager) -> Result<CallToolResult, McpError> {
    let outcome = manager.on_install().await?;
    json_result(&outcome)
}

/// Purge stale buckets and claim open pages.
pub async fn activate_impl(manager: &CacheManager) -> Result<CallToolResult, McpError> {
    let outcome = manager.on_activate().await?;
    json_result(&outcome)
}
