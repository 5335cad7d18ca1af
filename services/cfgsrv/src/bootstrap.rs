//! Database schema initialization

use fieldgate_config::schema;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::Result;

/// Create all tables and indexes needed by the configuration service
///
/// Idempotent: every statement is `IF NOT EXISTS`.
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    for ddl in schema::ALL_TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in schema::ALL_INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    info!("Database schema initialized");
    Ok(())
}
