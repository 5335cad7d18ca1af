//! Snapshot store
//!
//! Every submitted document is appended verbatim to `config_snapshots`
//! before normalization begins, so the raw text survives a failed import
//! for forensic recovery. Snapshots are immutable and never take part in
//! the delete/reinsert cycle.

use sqlx::{Row, SqlitePool};

use crate::error::{CfgSrvError, Result};

/// One stored snapshot
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: i64,
    pub raw: String,
    pub created_at: String,
}

/// Append the raw document text to the snapshot log
pub async fn save(pool: &SqlitePool, raw: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO config_snapshots (raw) VALUES (?)")
        .bind(raw)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Fetch the most recent snapshot
///
/// "Latest" is by creation timestamp descending; the rowid breaks ties
/// between snapshots stored within the same second.
pub async fn latest(pool: &SqlitePool) -> Result<Snapshot> {
    let row = sqlx::query(
        "SELECT id, raw, created_at FROM config_snapshots \
         ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?
    .ok_or(CfgSrvError::SnapshotNotFound)?;

    Ok(Snapshot {
        id: row.try_get("id")?,
        raw: row.try_get("raw")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Count stored snapshots (health reporting)
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM config_snapshots")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
