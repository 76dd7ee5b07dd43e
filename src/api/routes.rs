//! API Routes
//!
//! Configures the Axum router for the render cache front.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, page_handler, stats_handler, AppState};

/// Creates the main router.
///
/// # Endpoints
/// - `GET /stats` - Cache hit/miss/eviction counters
/// - `GET /health` - Health check endpoint
/// - any other path - Served from cache, rendered on miss
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(page_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
