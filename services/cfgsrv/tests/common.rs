//! Shared test scaffolding
//!
//! Provides a reusable test environment (temporary SQLite database with the
//! full schema) and sample document builders.

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable
#![allow(dead_code)] // Not every helper is used by every test binary

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::TempDir;

use cfgsrv::bootstrap;

/// Test environment context with a fully provisioned database
pub struct TestEnv {
    pub pool: SqlitePool,
    pub temp_dir: TempDir,
}

impl TestEnv {
    /// Create a temporary SQLite database with the full schema
    pub async fn create() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir.path().join("test_fieldgate.db");

        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await?;
        bootstrap::init_database(&pool).await?;

        Ok(Self { pool, temp_dir })
    }

    /// Borrow the database connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Count rows in a table
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// The worked example: one port, one device, one tag, plus a calculation
/// tag referencing the IO tag by name
pub const SAMPLE_DOCUMENT: &str = r#"
io_setup:
  ports:
    - id: p1
      type: serial
      name: COM1
      scan_time: 1000
      devices:
        - id: d1
          name: PLC1
          unit_number: 1
          tags:
            - id: t1
              name: Temp
              data_type: Analog
              address: 40001
calculation_tags:
  - id: c1
    name: TempAvg
    formula: a
    a: "PLC1:Temp"
    period: 60
"#;

/// A document exercising every entity kind
pub const FULL_DOCUMENT: &str = r#"
io_setup:
  ports:
    - id: p1
      type: tcpip
      name: eth0
      devices:
        - id: d1
          name: PLC1
          tags:
            - id: t1
              name: Temp
            - id: t2
              name: Pressure
calculation_tags:
  - id: c1
    a: "PLC1:Temp"
    b: "PLC1:Pressure"
stats_tags:
  - id: 100
    name: TempStats
    refer_tag: "PLC1:Temp"
    type: average
    update_cycle_value: 5
    update_cycle_unit: min
communication_forward:
  bridges:
    - id: br1
      blocks:
        - id: blk1
          type: source
          label: "from plc"
        - id: blk2
          type: destination
          sub_type: mqtt
          config:
            topic: plant/1
"#;
