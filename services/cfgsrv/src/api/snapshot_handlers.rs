//! Snapshot API handlers

use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::AppError;
use serde::Serialize;

use crate::app_state::AppState;
use crate::deploy::snapshot;

/// Latest stored snapshot in wire shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub raw: String,
    pub created_at: String,
}

/// Fetch the most recently deployed raw document
///
/// @route GET /api/config/raw
pub async fn latest_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SnapshotResponse>, AppError> {
    let snapshot = snapshot::latest(state.db.pool())
        .await
        .map_err(AppError::from)?;

    Ok(Json(SnapshotResponse {
        raw: snapshot.raw,
        created_at: snapshot.created_at,
    }))
}
