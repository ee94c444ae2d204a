pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http_backend;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod submitter;

// Re-export key functions for convenience
pub use app::{AppState, create_app, init_tracing};
