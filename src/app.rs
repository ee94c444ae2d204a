use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::pipeline::{OpenAiCompletion, QueryTranslator, SofarClient};
use crate::routes::create_routes;

/// Initialize tracing and logging for the application
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sofar_query_svc=info,tower_http=debug,axum::rejection=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Clients shared by every request. Built once at startup and handed to the
/// handlers through router state.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<QueryTranslator>,
    pub sofar: Arc<SofarClient>,
}

impl AppState {
    pub fn new(translator: QueryTranslator, sofar: SofarClient) -> Self {
        Self {
            translator: Arc::new(translator),
            sofar: Arc::new(sofar),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        info!("Initializing OpenAI client with model {}", config.openai_model);
        let completion = OpenAiCompletion::new(&config.openai_api_key, &config.openai_model);
        let translator = QueryTranslator::new(Arc::new(completion), &config.spotter_id);
        let sofar = SofarClient::new(
            &config.sofar_base_url,
            &config.sofar_api_key,
            &config.spotter_id,
        );
        Self::new(translator, sofar)
    }
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    info!("Initializing application router");

    create_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
