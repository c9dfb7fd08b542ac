//! Request classification.

use std::fmt;

use swcache_core::Request;

use crate::fetch::path_extension;

/// How a request is resolved between the bucket and the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Serve from the bucket when present; the network is only a miss path.
    CacheFirst,
    /// Prefer a live response; the bucket is the offline path.
    NetworkFirst,
    /// Serve the bucket copy now and refresh it in the background.
    StaleWhileRevalidate,
}

/// Stylesheets, scripts and fonts.
const STATIC_EXTENSIONS: &[&str] = &["css", "js", "woff", "woff2", "ttf"];

/// Images and video.
const MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "mp4"];

impl Strategy {
    /// Classify a URL path. Navigations are always documents.
    pub fn classify(path: &str, is_navigation: bool) -> Self {
        if is_navigation || path.is_empty() || path.ends_with('/') {
            return Strategy::NetworkFirst;
        }

        match path_extension(path).as_deref() {
            Some("html") => Strategy::NetworkFirst,
            Some(ext) if STATIC_EXTENSIONS.contains(&ext) || MEDIA_EXTENSIONS.contains(&ext) => Strategy::CacheFirst,
            _ => Strategy::StaleWhileRevalidate,
        }
    }

    pub fn for_request(request: &Request) -> Self {
        Self::classify(request.url.path(), request.is_navigation())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "CACHE_FIRST",
            Strategy::NetworkFirst => "NETWORK_FIRST",
            Strategy::StaleWhileRevalidate => "STALE_WHILE_REVALIDATE",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
