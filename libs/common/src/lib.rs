//! Fieldgate basic library
//!
//! Provides basic functions shared by all services, including:
//! - SQLite client
//! - logging functions
//! - API response envelope
//! - graceful shutdown handling

pub mod api_types;
pub mod logging;
pub mod shutdown;
pub mod sqlite;

// Re-export commonly used API types at crate root for convenience
pub use api_types::{AppError, ErrorInfo, ErrorResponse, SuccessResponse};

// Re-export SQLite types
pub use sqlite::{SqliteClient, SqlitePool};

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;
