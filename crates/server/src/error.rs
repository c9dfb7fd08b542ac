//! Structured errors raised by the host's tool layer.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Errors from validating tool calls, before the manager is involved.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid tool parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The named bucket does not exist.
    #[error("BUCKET_NOT_FOUND: {0}")]
    BucketNotFound(String),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let (code, message) = match &err {
            HostError::InvalidInput(msg) => (-32602, msg.clone()),
            HostError::BucketNotFound(msg) => (-32001, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_codes() {
        let err: McpError = HostError::InvalidInput("url cannot be empty".into()).into();
        assert_eq!(err.code.0, -32602);

        let err: McpError = HostError::BucketNotFound("app-cache-v0".into()).into();
        assert_eq!(err.code.0, -32001);
        assert_eq!(err.message, "app-cache-v0");
    }
}
