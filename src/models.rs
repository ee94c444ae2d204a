use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for the generate-query endpoint
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GenerateQueryRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Request payload for the sofar-call endpoint. The query is kept untyped
/// here so a missing `parameters` field can be told apart from a bad body.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SofarCallRequest {
    #[serde(rename = "aiQuery", default)]
    pub ai_query: Option<Value>,
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}

impl GenerateQueryRequest {
    /// The prompt, if one was supplied and is not just whitespace
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.trim().is_empty())
    }
}
