//! API route configuration
//!
//! Central route definition for all configuration service endpoints.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::deploy_handlers::deploy_config;
use crate::api::health_handlers::health_check;
use crate::api::snapshot_handlers::latest_config;
use crate::app_state::AppState;

/// Create all API routes for the configuration service
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Configuration deployment and retrieval
        .route("/api/config/deploy", post(deploy_config))
        .route("/api/config/raw", get(latest_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
