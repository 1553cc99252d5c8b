// src/handlers/mod.rs
pub mod analyze;

use crate::services::pipeline::Pipeline;
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state handed to every handler
pub struct AppState {
    pub pipeline: Pipeline,
}

/// Build the HTTP application with logging, CORS and shared state layers
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(analyze::analyze_routes())
        .layer(axum::middleware::from_fn(crate::middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
