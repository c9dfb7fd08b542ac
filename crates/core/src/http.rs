//! Request and response types shared by storage, network and the manager.

use std::collections::BTreeMap;

use bytes::Bytes;
use url::Url;

/// How the page issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level document load from the address bar or a link.
    Navigate,
    #[default]
    SameOrigin,
    Cors,
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Uppercase HTTP method.
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    pub fn new(method: &str, url: Url, mode: RequestMode) -> Self {
        Self { method: method.to_ascii_uppercase(), url, mode }
    }

    /// A plain subresource GET.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url, RequestMode::SameOrigin)
    }

    /// A navigation GET.
    pub fn navigate(url: Url) -> Self {
        Self::new("GET", url, RequestMode::Navigate)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// The URL used as the cache key: fragment stripped, everything else kept.
    pub fn cache_url(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}

/// A response body plus the metadata worth keeping in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    /// Lowercased header names.
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        let mut headers = BTreeMap::new();
        if let Some(ct) = &content_type {
            headers.insert("content-type".to_string(), ct.clone());
        }
        Self { status, content_type, headers, body: body.into() }
    }

    pub fn html(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, Some("text/html".into()), body)
    }

    pub fn text(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, Some("text/plain".into()), body)
    }

    /// Only exactly-200 responses are written to the bucket.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossy.
    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
