use crate::app::AppState;
use crate::handlers::{generate_query_handler, health_check, root, sofar_call_handler};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/generate-query", post(generate_query_handler))
        .route("/api/sofar-call", post(sofar_call_handler))
}
