//! Diagnostic sink for failures the manager recovers from on its own.
//!
//! None of these reach the caller; they exist so hosts can log them and
//! tests can assert they happened.

use std::fmt;

/// A recovered failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Background refresh of a stale entry failed.
    RevalidationFailed { url: String, error: String },
    /// A fresh response could not be written to the bucket.
    StorePutFailed { url: String, error: String },
    /// Bucket lookup failed and was treated as a miss.
    StoreLookupFailed { url: String, error: String },
    /// The network could not produce a response; a fallback was served.
    NetworkFailed { url: String, error: String },
}

impl Diagnostic {
    pub fn url(&self) -> &str {
        match self {
            Diagnostic::RevalidationFailed { url, .. }
            | Diagnostic::StorePutFailed { url, .. }
            | Diagnostic::StoreLookupFailed { url, .. }
            | Diagnostic::NetworkFailed { url, .. } => url,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::RevalidationFailed { url, error } => write!(f, "revalidation of {url} failed: {error}"),
            Diagnostic::StorePutFailed { url, error } => write!(f, "caching {url} failed: {error}"),
            Diagnostic::StoreLookupFailed { url, error } => write!(f, "cache lookup for {url} failed: {error}"),
            Diagnostic::NetworkFailed { url, error } => write!(f, "network fetch of {url} failed: {error}"),
        }
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: emits tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::NetworkFailed { url, error } => {
                tracing::debug!(url = %url, error = %error, "serving fallback after network failure")
            }
            Diagnostic::RevalidationFailed { url, error } => {
                tracing::debug!(url = %url, error = %error, "background refresh failed")
            }
            Diagnostic::StorePutFailed { url, error } | Diagnostic::StoreLookupFailed { url, error } => {
                tracing::warn!(url = %url, error = %error, "{diagnostic}")
            }
        }
    }
}
