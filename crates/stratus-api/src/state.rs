//! Application state shared across all handlers.

use std::sync::Arc;

use stratus_core::config::AppConfig;
use stratus_core::traits::{NodeStore, StorageProvider};
use stratus_database::DatabasePool;
use stratus_service::{DownloadService, PreviewService, TreeService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database pool (health checks).
    pub db: DatabasePool,
    /// Node metadata store.
    pub store: Arc<dyn NodeStore>,
    /// Physical storage backend.
    pub storage: Arc<dyn StorageProvider>,
    /// Tree-consistency engine.
    pub tree_service: Arc<TreeService>,
    /// Text preview service.
    pub preview_service: Arc<PreviewService>,
    /// Download service.
    pub download_service: Arc<DownloadService>,
}
