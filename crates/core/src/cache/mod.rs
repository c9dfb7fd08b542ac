//! SQLite-backed bucket storage for cached responses.
//!
//! This module provides persistent, versioned cache buckets using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Request-addressed entries using SHA-256 hashing of method and URL
//! - Automatic schema migrations
//! - WAL mode for concurrent fetch handlers
//! - Whole-bucket deletion on version rollover

pub mod buckets;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use buckets::BucketInfo;
pub use connection::CacheDb;
pub use entries::StoredEntry;
pub use storage::CacheStorage;
