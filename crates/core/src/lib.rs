//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Bucket storage with SQLite backend
//! - Request/response types
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{BucketInfo, CacheDb, CacheStorage, StoredEntry};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, RequestMode, Response};
