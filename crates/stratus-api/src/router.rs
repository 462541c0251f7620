//! Route definitions for the Stratus Drive HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(node_routes())
        .merge(folder_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Node listing, upload, rename, move, delete, preview, download.
fn node_routes() -> Router<AppState> {
    Router::new()
        .route("/nodes", get(handlers::node::list_nodes))
        .route("/nodes/recent", get(handlers::node::recent_nodes))
        .route("/nodes/upload", post(handlers::node::upload_node))
        .route("/nodes/{id}", get(handlers::node::get_node))
        .route("/nodes/{id}", delete(handlers::node::delete_node))
        .route("/nodes/{id}/rename", put(handlers::node::rename_node))
        .route("/nodes/{id}/move", put(handlers::node::move_node))
        .route("/nodes/{id}/preview", get(handlers::node::preview_node))
        .route("/nodes/{id}/download", get(handlers::node::download_node))
}

/// Folder creation.
fn folder_routes() -> Router<AppState> {
    Router::new().route("/folders", post(handlers::node::create_folder))
}

/// Health check endpoints (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
}

/// Build CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> tower_http::cors::CorsLayer {
    use axum::http::{HeaderValue, Method};
    use tower_http::cors::{Any, CorsLayer};

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new().allow_headers(Any);

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    cors.max_age(std::time::Duration::from_secs(
        cors_config.max_age_seconds,
    ))
}
