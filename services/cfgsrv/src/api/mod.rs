//! API handlers for the configuration service

pub mod deploy_handlers;
pub mod health_handlers;
pub mod snapshot_handlers;
