//! MCP tool implementations.
//!
//! Each tool maps to one worker event or one cache inspection.

pub mod cache;
pub mod lifecycle;
pub mod push;
pub mod sw_fetch;

#[cfg(test)]
pub(crate) mod support;

use rmcp::{ErrorData as McpError, model::*};
use serde::Serialize;
use swcache_core::Error;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
