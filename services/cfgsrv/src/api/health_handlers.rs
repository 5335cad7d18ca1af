//! Health check API handlers

#![allow(clippy::disallowed_methods)] // json! macro

use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::{AppError, SuccessResponse};
use serde_json::json;

use crate::app_state::AppState;
use crate::deploy::snapshot;

/// Health check endpoint
///
/// Reports database connectivity, current entity counts, and the size of
/// the snapshot log.
///
/// @route GET /health
/// @side-effects None (read-only operation)
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<serde_json::Value>>, AppError> {
    state
        .db
        .health_check()
        .await
        .map_err(|e| AppError::service_unavailable(format!("Database unavailable: {}", e)))?;

    let pool = state.db.pool();
    let ports = count_rows(pool, "io_ports").await.unwrap_or(0);
    let devices = count_rows(pool, "devices").await.unwrap_or(0);
    let tags = count_rows(pool, "io_tags").await.unwrap_or(0);
    let snapshots = snapshot::count(pool).await.unwrap_or(0);

    Ok(Json(SuccessResponse::new(json!({
        "status": "healthy",
        "service": state.config.service.name,
        "database": state.db.path(),
        "ioPorts": ports,
        "devices": devices,
        "tags": tags,
        "snapshots": snapshots,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))))
}

async fn count_rows(pool: &sqlx::SqlitePool, table: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
}
