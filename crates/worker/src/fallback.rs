//! Responses synthesized when neither the network nor the bucket can answer.

use swcache_core::Response;

/// Inline notice for offline navigations with nothing cached to show.
pub const OFFLINE_HTML: &str = "<!DOCTYPE html>\
<html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>Offline</title></head>\
<body><h1>You are offline</h1>\
<p>This page isn't available without a connection. Check your network and try again.</p>\
</body></html>";

pub const NETWORK_ERROR_BODY: &str = "Network error";

/// `200 text/html` offline notice.
pub fn offline_document() -> Response {
    Response::html(200, OFFLINE_HTML)
}

/// `408 text/plain` for subresources that could not be fetched.
pub fn network_error() -> Response {
    Response::text(408, NETWORK_ERROR_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_document() {
        let resp = offline_document();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type.as_deref(), Some("text/html"));
        assert!(resp.text_body().contains("offline"));
    }

    #[test]
    fn test_network_error() {
        let resp = network_error();
        assert_eq!(resp.status, 408);
        assert_eq!(resp.content_type.as_deref(), Some("text/plain"));
        assert_eq!(resp.text_body(), "Network error");
    }
}
