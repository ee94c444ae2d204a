use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::pipeline::{FetchError, TranslationError};

/// Custom error type for the application
#[derive(Debug)]
pub enum AppError {
    MissingInput(String),
    ValidationError(String),
    Translation(TranslationError),
    Fetch(FetchError),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    #[serde(rename = "rawOutput", skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message, raw_output) = match self {
            AppError::MissingInput(msg) => (StatusCode::BAD_REQUEST, "MISSING_INPUT", msg, None),
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None)
            }
            AppError::Translation(err) => {
                error!("Query translation failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TRANSLATION_ERROR",
                    err.to_string(),
                    err.raw_output().map(str::to_string),
                )
            }
            AppError::Fetch(err) => {
                error!("Sofar API call failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FETCH_ERROR",
                    err.to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            kind: kind.to_string(),
            raw_output,
        });

        (status, body).into_response()
    }
}

// Malformed bodies get the same JSON error shape as every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<TranslationError> for AppError {
    fn from(err: TranslationError) -> Self {
        AppError::Translation(err)
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;
