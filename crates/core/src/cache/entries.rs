//! Entry CRUD within a bucket.
//!
//! Entries are keyed by [`compute_cache_key`] over the request's method and
//! fragment-less URL. Writes are upserts, so the last write for a key wins.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use crate::http::{Request, Response};
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// An entry as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub bucket: String,
    pub key_hash: String,
    pub method: String,
    pub url: String,
    pub response: Response,
    pub stored_at: String,
}

type EntryRow = (String, String, String, String, u16, Option<String>, String, Vec<u8>, String);

fn entry_from_row(row: EntryRow) -> Result<StoredEntry, Error> {
    let (bucket, key_hash, method, url, status, content_type, headers_json, body, stored_at) = row;
    let headers: BTreeMap<String, String> =
        serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
    Ok(StoredEntry {
        bucket,
        key_hash,
        method,
        url,
        response: Response { status, content_type, headers, body: body.into() },
        stored_at,
    })
}

const ENTRY_COLUMNS: &str =
    "bucket, key_hash, method, url, status_code, content_type, headers_json, body, stored_at";

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

impl CacheDb {
    /// Store a response for a request, creating the bucket if needed.
    pub async fn put_entry(&self, bucket: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let url = request.cache_url();
        let key_hash = compute_cache_key(&request.method, &url);
        let method = request.method.clone();
        let bucket = bucket.to_string();
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("unserializable headers for {url}: {e}")))?;
        let status = response.status;
        let content_type = response.content_type.clone();
        let body = response.body.to_vec();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO buckets (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
                    params![bucket, now],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                        bucket, key_hash, method, url, status_code, content_type, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(bucket, key_hash) DO UPDATE SET
                        status_code = excluded.status_code,
                        content_type = excluded.content_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![bucket, key_hash, method, url, status, content_type, headers_json, body, now],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for a request.
    ///
    /// Returns None if the bucket or the entry doesn't exist.
    pub async fn match_entry(&self, bucket: &str, request: &Request) -> Result<Option<Response>, Error> {
        let key_hash = compute_cache_key(&request.method, &request.cache_url());
        let bucket = bucket.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE bucket = ?1 AND key_hash = ?2");
                let mut stmt = conn.prepare(&sql)?;
                match stmt.query_row(params![bucket, key_hash], read_row) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(entry_from_row).transpose().map(|e| e.map(|e| e.response))
    }

    /// All entries of a bucket, oldest first.
    pub async fn entries(&self, bucket: &str) -> Result<Vec<StoredEntry>, Error> {
        let bucket = bucket.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<EntryRow>, Error> {
                let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE bucket = ?1 ORDER BY stored_at, url");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![bucket], read_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter().map(entry_from_row).collect()
    }

    /// Remove one entry. Returns false if it was not stored.
    pub async fn delete_entry(&self, bucket: &str, request: &Request) -> Result<bool, Error> {
        let key_hash = compute_cache_key(&request.method, &request.cache_url());
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE bucket = ?1 AND key_hash = ?2",
                    params![bucket, key_hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
