//! Axum router construction for the monitor API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled so a dashboard served from another origin can poll the API.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the monitor server.
///
/// The router includes:
/// - `GET /` -- dashboard page
/// - `POST /api/upload` -- push ingestion
/// - `GET /api/status` -- poll endpoint
/// - `GET /api/history` -- archived readings
///
/// CORS is configured to allow any origin for development. In production
/// this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard
        .route("/", get(handlers::index))
        // REST API
        .route("/api/upload", post(handlers::upload))
        .route("/api/status", get(handlers::get_status))
        .route("/api/history", get(handlers::get_history))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
