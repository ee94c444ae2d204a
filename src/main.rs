use sofar_query_svc::app::{AppState, create_app, init_tracing};
use sofar_query_svc::config::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing/logging
    init_tracing();

    info!("Starting Sofar query service...");

    // Both API keys are required; refuse to start without them
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration loaded: {:?}", config);

    let app = create_app(AppState::from_config(&config));

    // Create TCP listener
    let listener = match tokio::net::TcpListener::bind(&config.bind_address()).await {
        Ok(listener) => {
            info!("Server running on {}", config.server_url());
            info!("Health check: GET /");
            info!("Query endpoints: POST /api/generate-query, POST /api/sofar-call");
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", config.bind_address(), e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Server starting...");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    } else {
        info!("Server shutdown gracefully");
    }
}
