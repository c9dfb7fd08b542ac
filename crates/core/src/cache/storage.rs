//! The storage seam the cache manager is written against.

use async_trait::async_trait;

use super::buckets::BucketInfo;
use super::connection::CacheDb;
use super::entries::StoredEntry;
use crate::Error;
use crate::http::{Request, Response};

/// Named buckets of request → response entries.
///
/// Mirrors the browser's cache storage: buckets are opened by name,
/// enumerated, and deleted wholesale; entries are matched and put by request.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a bucket, creating it if absent.
    async fn open_bucket(&self, name: &str) -> Result<(), Error>;

    async fn has_bucket(&self, name: &str) -> Result<bool, Error>;

    async fn bucket_names(&self) -> Result<Vec<String>, Error>;

    /// Returns false if nothing was deleted.
    async fn delete_bucket(&self, name: &str) -> Result<bool, Error>;

    async fn match_entry(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error>;

    async fn put_entry(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error>;

    async fn entries(&self, bucket: &str) -> Result<Vec<StoredEntry>, Error>;

    async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error>;

    async fn bucket_info(&self) -> Result<Vec<BucketInfo>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open_bucket(&self, name: &str) -> Result<(), Error> {
        self.create_bucket(name).await
    }

    async fn has_bucket(&self, name: &str) -> Result<bool, Error> {
        CacheDb::has_bucket(self, name).await
    }

    async fn bucket_names(&self) -> Result<Vec<String>, Error> {
        CacheDb::bucket_names(self).await
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, Error> {
        CacheDb::delete_bucket(self, name).await
    }

    async fn match_entry(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        CacheDb::match_entry(self, bucket, request).await
    }

    async fn put_entry(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        CacheDb::put_entry(self, bucket, request, response).await
    }

    async fn entries(&self, bucket: &str) -> Result<Vec<StoredEntry>, Error> {
        CacheDb::entries(self, bucket).await
    }

    async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error> {
        CacheDb::delete_entry(self, bucket, request).await
    }

    async fn bucket_info(&self) -> Result<Vec<BucketInfo>, Error> {
        CacheDb::bucket_info(self).await
    }
}
