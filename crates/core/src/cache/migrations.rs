//! Database schema migrations.
//!
//! A `_migrations` table records the highest applied version; anything newer
//! in [`MIGRATIONS`] is applied in order inside one transaction per step.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Migration list: (version, description, SQL).
///
/// Versions are strictly increasing. Every statement uses `IF NOT EXISTS`
/// so a half-recorded step can be replayed.
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (1, "buckets and entries", include_str!("../../migrations/001_buckets.sql")),
    (2, "entry lookup indexes", include_str!("../../migrations/002_entry_indexes.sql")),
];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` naming the step if its SQL fails to execute.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::from)?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))
            .map_err(Error::from)?;

        for (version, description, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("{version} ({description}): {e}")))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::debug!(version, description, "applied cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
