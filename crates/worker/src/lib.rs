//! Offline cache manager for swcache.
//!
//! This crate provides the network seam, request classification, the three
//! caching strategies, and the lifecycle/push event handlers a host drives.

pub mod diagnostics;
pub mod fallback;
pub mod fetch;
pub mod host;
pub mod manager;
pub mod push;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
pub use fetch::{FetchClient, FetchConfig, Network};
pub use host::{WindowClient, WorkerHost};
pub use manager::{
    ActivateOutcome, CacheManager, FetchOutcome, InstallOutcome, ManagerConfig, ResponseSource, WorkerState,
};
pub use push::{ClickOutcome, Notification, PushPayload};
pub use strategy::Strategy;
