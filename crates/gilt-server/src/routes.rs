//! Route definitions.

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use gilt_traits::GiltReferenceSource;

use crate::handlers::{self, AppState};

/// Create the API router.
///
/// # Arguments
/// * `source` - Reference data for conventional gilts
pub fn create_router(source: Arc<dyn GiltReferenceSource>) -> Router {
    let state = Arc::new(AppState { source });

    Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Gilts
        .route("/gilts/api/gilts", get(handlers::list_gilts))
        .route("/gilts/api/yield", post(handlers::calculate_yield))
        .with_state(state)
}

/// Serve front-end assets under `/gilts`, behind the API routes.
///
/// `/gilts` and `/gilts/` return `index.html`.
pub fn with_static_files(router: Router, static_dir: impl AsRef<Path>) -> Router {
    let assets = Router::new().nest_service("/gilts", ServeDir::new(static_dir));
    router.fallback_service(assets)
}
