//! Deployment API handlers

use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::AppError;
use tracing::info;

use crate::app_state::AppState;
use crate::deploy::{run_deployment, DeployReport};

/// Deploy a configuration document
///
/// Accepts the raw YAML or JSON text as the request body, runs the full
/// import pipeline, and answers with per-entity counts. Deployments are
/// serialized: a second request waits until the running one commits.
///
/// @route POST /api/config/deploy
pub async fn deploy_config(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<DeployReport>, AppError> {
    let _guard = state.deploy_lock.lock().await;

    info!("Deploy requested: {} bytes", body.len());
    let report = run_deployment(state.db.pool(), &body, &state.config.import)
        .await
        .map_err(AppError::from)?;

    Ok(Json(report))
}
