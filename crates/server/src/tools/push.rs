//! sw_push and sw_notification_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_worker::{CacheManager, Notification};

use super::json_result;

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Raw push message body: JSON with `title`, `body` and optional `url`.
    pub payload: String,
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    pub title: String,
    pub body: String,
    /// Page to focus or open (default: "/").
    #[serde(default)]
    pub url: Option<String>,
}

/// Implementation of the sw_push tool.
pub async fn push_impl(manager: &CacheManager, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let notification = manager.on_push(params.payload.as_bytes()).await?;
    json_result(&notification)
}

/// Implementation of the sw_notification_click tool.
pub async fn click_impl(
    manager: &CacheManager, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let notification = Notification {
        title: params.title,
        body: params.body,
        icon: None,
        badge: None,
        url: params.url.unwrap_or_else(|| swcache_worker::push::DEFAULT_CLICK_URL.into()),
    };
    let outcome = manager.on_notification_click(&notification).await?;
    json_result(&outcome)
}
