//! Application state shared across API handlers

use std::sync::Arc;

use common::SqliteClient;
use tokio::sync::Mutex;

use crate::config::CfgsrvConfig;

/// Shared state for the configuration service
pub struct AppState {
    /// Service configuration
    pub config: Arc<CfgsrvConfig>,

    /// SQLite client backing the entity tables and the snapshot log
    pub db: SqliteClient,

    /// Serializes deployments: two concurrent imports would race on the
    /// shared entity tables, so the second waits for the first to finish.
    pub deploy_lock: Mutex<()>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Arc<CfgsrvConfig>, db: SqliteClient) -> Self {
        Self {
            config,
            db,
            deploy_lock: Mutex::new(()),
        }
    }
}
