//! cfgsrv main program
//!
//! Service startup and command line interface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use cfgsrv::app_state::AppState;
use cfgsrv::bootstrap;
use cfgsrv::config::CfgsrvConfig;
use cfgsrv::error::{CfgSrvError, Result};
use cfgsrv::routes::create_routes;
use common::sqlite::SqliteClient;

#[derive(Parser, Debug)]
#[command(author, version, about = "cfgsrv - gateway configuration service")]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check configuration and database connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = CfgsrvConfig::load(args.config.as_deref())?;
    config.validate()?;

    let log_dir = config.logging.dir.as_ref().map(PathBuf::from);
    let _log_guard = common::logging::init(
        &config.service.name,
        &config.logging.level,
        log_dir.as_deref(),
    )
    .map_err(|e| CfgSrvError::Config(format!("Failed to initialize logging: {}", e)))?;

    match args.command {
        Some(Commands::Check) => check(config).await,
        None => run_service(config).await,
    }
}

/// Validate configuration and database connectivity, then exit
async fn check(config: CfgsrvConfig) -> Result<()> {
    info!("Checking configuration");

    let db = SqliteClient::new(&config.database.path)
        .await
        .map_err(|e| CfgSrvError::Config(format!("Database check failed: {}", e)))?;
    bootstrap::init_database(db.pool()).await?;
    db.health_check()
        .await
        .map_err(|e| CfgSrvError::Config(format!("Database check failed: {}", e)))?;

    info!("Configuration OK: db={}", config.database.path);
    Ok(())
}

/// Run the service
async fn run_service(config: CfgsrvConfig) -> Result<()> {
    info!(
        "Starting {} v{}",
        config.service.name,
        env!("CARGO_PKG_VERSION")
    );

    let db = SqliteClient::new(&config.database.path)
        .await
        .map_err(|e| CfgSrvError::Config(format!("Failed to open database: {}", e)))?;
    bootstrap::init_database(db.pool()).await?;

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let state = Arc::new(AppState::new(Arc::new(config), db));
    let app = create_routes(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await?;

    info!("Service stopped");
    Ok(())
}
