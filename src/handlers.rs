use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{GenerateQueryRequest, HealthResponse, SofarCallRequest};
use crate::pipeline::{ProviderResponse, QueryShapeError, StructuredQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::Json as ResponseJson;
use tracing::{debug, info};

pub const ROOT_MESSAGE: &str = "Sofar API backend is running. Use the /api endpoints.";

/// Plaintext liveness check
pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    let response = HealthResponse::ok();

    info!("Health check successful");
    Ok(ResponseJson(response))
}

/// Translate a natural-language prompt into a structured Sofar query
pub async fn generate_query_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQueryRequest>, JsonRejection>,
) -> AppResult<ResponseJson<StructuredQuery>> {
    let Json(payload) = payload?;
    let prompt = payload
        .prompt()
        .ok_or_else(|| AppError::MissingInput("Missing prompt".to_string()))?;
    info!("Generate-query endpoint called with prompt: {}", prompt);

    let query = state.translator.translate(prompt).await?;

    info!("Successfully translated prompt, returning query");
    Ok(ResponseJson(query))
}

/// Forward a structured query to the Sofar latest-data API
pub async fn sofar_call_handler(
    State(state): State<AppState>,
    payload: Result<Json<SofarCallRequest>, JsonRejection>,
) -> AppResult<ResponseJson<ProviderResponse>> {
    let Json(payload) = payload?;
    let ai_query = payload
        .ai_query
        .ok_or_else(|| AppError::MissingInput("Missing or invalid aiQuery".to_string()))?;

    let query = StructuredQuery::from_json(ai_query).map_err(|e| match e {
        QueryShapeError::MissingParameters => {
            AppError::MissingInput("Missing or invalid aiQuery".to_string())
        }
        QueryShapeError::Invalid(msg) => AppError::ValidationError(msg),
    })?;
    info!("Sofar-call endpoint called for endpoint {}", query.endpoint);

    let data = state.sofar.fetch(&query).await?;

    info!("Successfully fetched Sofar data");
    Ok(ResponseJson(data))
}
