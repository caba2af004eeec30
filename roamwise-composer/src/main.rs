//! roamwise-composer - Trip composition service
//!
//! Builds trips from geo-data provider records and generated destination
//! content, stores them in SQLite and serves them over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roamwise_common::config::ROOT_FOLDER_ENV;
use roamwise_composer::db::SqliteTripStore;
use roamwise_composer::services::{
    ContentGenerator, DualStrategyFetcher, GeminiClient, TravelAdvisorClient, TripComposer,
};
use roamwise_composer::AppState;

/// Command-line arguments for roamwise-composer
#[derive(Parser, Debug)]
#[command(name = "roamwise-composer")]
#[command(about = "Trip composition service for Roamwise")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to ~/.config/roamwise/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "ROAMWISE_PORT")]
    port: Option<u16>,

    /// Root folder holding the database (overrides env and config)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = roamwise_common::config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "roamwise_composer={level},roamwise_common={level},tower_http=info",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        profile = env!("BUILD_PROFILE"),
        "Starting roamwise-composer"
    );

    let root_folder =
        roamwise_common::config::resolve_root_folder(args.root_folder.as_deref(), &config);
    info!("Root folder: {} (override with {})", root_folder.display(), ROOT_FOLDER_ENV);

    let db_path = roamwise_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());
    let db_pool = roamwise_composer::db::init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;

    let provider_key =
        roamwise_composer::config::resolve_provider_api_key(&db_pool, &config).await?;
    let generator_key =
        roamwise_composer::config::resolve_generator_api_key(&db_pool, &config).await?;

    let provider = TravelAdvisorClient::new(&config.provider, provider_key)
        .context("Failed to build provider client")?;
    let generator = GeminiClient::new(&config.generator, generator_key)
        .context("Failed to build generator client")?;

    let composer = TripComposer::new(
        DualStrategyFetcher::new(Arc::new(provider)),
        ContentGenerator::new(Arc::new(generator)),
        Arc::new(SqliteTripStore::new(db_pool.clone())),
    );

    let state = AppState::new(
        db_pool,
        Arc::new(composer),
        Duration::from_secs(config.request_deadline_secs),
    );
    let app = roamwise_composer::build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
