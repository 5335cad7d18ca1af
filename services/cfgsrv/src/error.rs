//! Error types for the configuration service

use common::AppError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CfgSrvError>;

#[derive(Error, Debug)]
pub enum CfgSrvError {
    /// Neither YAML nor JSON could decode the submitted document
    #[error("Invalid config format")]
    InvalidConfigFormat,

    /// "Get latest" called before any snapshot was ever stored
    #[error("No configuration snapshot stored")]
    SnapshotNotFound,

    /// Strict import policy rejected the document
    #[error("Strict mode violation: {0}")]
    StrictMode(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CfgSrvError> for AppError {
    fn from(err: CfgSrvError) -> Self {
        match &err {
            CfgSrvError::InvalidConfigFormat => AppError::bad_request(err.to_string()),
            CfgSrvError::SnapshotNotFound => AppError::not_found(err.to_string()),
            CfgSrvError::StrictMode(detail) => {
                AppError::bad_request("Import rejected by strict policy").with_details(detail)
            },
            _ => AppError::internal_error(err.to_string()),
        }
    }
}
