//! Stratus Drive server — personal cloud storage.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use stratus_api::AppState;
use stratus_core::config::AppConfig;
use stratus_core::error::AppError;
use stratus_core::traits::{NodeStore, StorageProvider};
use stratus_database::DatabasePool;
use stratus_database::repositories::PgNodeStore;
use stratus_service::{DownloadService, PreviewService, TreeService};
use stratus_storage::LocalStorageProvider;

#[tokio::main]
async fn main() {
    let env = std::env::var("STRATUS_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Stratus Drive v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Storage root ─────────────────────────────────────
    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    tracing::info!(root = %config.storage.root_path, "Storage initialized");

    // ── Step 2: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    stratus_database::migration::run_migrations(db.pool()).await?;

    let store: Arc<dyn NodeStore> = Arc::new(PgNodeStore::new(db.pool().clone()));

    // ── Step 3: Services ─────────────────────────────────────────
    let tree_service = Arc::new(TreeService::new(
        Arc::clone(&store),
        Arc::clone(&storage),
        config.storage.clone(),
    ));
    let preview_service = Arc::new(PreviewService::new(
        Arc::clone(&store),
        Arc::clone(&storage),
        config.storage.clone(),
    ));
    let download_service = Arc::new(DownloadService::new(
        Arc::clone(&store),
        Arc::clone(&storage),
    ));
    tracing::info!("Services initialized");

    // ── Step 4: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        db: db.clone(),
        store,
        storage,
        tree_service,
        preview_service,
        download_service,
    };

    let app = stratus_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Stratus Drive server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    tracing::info!("Stratus Drive server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
