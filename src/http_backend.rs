use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::pipeline::{ProviderResponse, StructuredQuery};
use crate::submitter::{BackendError, QueryBackend};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5050";

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// [`QueryBackend`] that talks to a running query service over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn generate_query(&self, prompt: &str) -> Result<StructuredQuery, BackendError> {
        self.post("/api/generate-query", &json!({ "prompt": prompt }))
            .await
    }

    async fn fetch_data(&self, query: &StructuredQuery) -> Result<ProviderResponse, BackendError> {
        self.post("/api/sofar-call", &json!({ "aiQuery": query }))
            .await
    }
}
