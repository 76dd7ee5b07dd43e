//! API Module
//!
//! HTTP surface for the render cache: the page fallback route plus
//! observability endpoints.
//!
//! # Endpoints
//! - `GET /stats` - Cache counters
//! - `GET /health` - Health check
//! - everything else - cached page or fresh render

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
