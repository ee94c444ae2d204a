use thiserror::Error;
use tracing::{debug, info, warn};

use super::{LATEST_DATA_ENDPOINT, ProviderResponse, QueryFlag, QueryParameters, StructuredQuery};

pub const SOFAR_BASE_URL: &str = "https://api.sofarocean.com/api";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Sofar API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Client for Sofar's latest-data endpoint. The API token comes from
/// configuration and is never taken from a translated query.
pub struct SofarClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    default_spotter_id: String,
}

impl SofarClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        default_spotter_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            default_spotter_id: default_spotter_id.into(),
        }
    }

    /// Query-string pairs for `params`. Flags appear as `"true"` only when
    /// set; unset flags are left out, which the provider reads as "not
    /// requested".
    pub fn query_pairs(&self, params: &QueryParameters) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("token", self.token.clone()),
            (
                "spotterId",
                params.spotter_id_or(&self.default_spotter_id).to_string(),
            ),
        ];

        if let Some(sources) = params
            .processing_sources
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            pairs.push(("processingSources", sources.to_string()));
        }

        for flag in QueryFlag::ALL {
            if params.is_set(flag) {
                pairs.push((flag.param_name(), "true".to_string()));
            }
        }

        pairs
    }

    pub fn latest_data_url(&self, params: &QueryParameters) -> String {
        format!(
            "{}/{}?{}",
            self.base_url,
            LATEST_DATA_ENDPOINT,
            encode_query(&self.query_pairs(params))
        )
    }

    /// Request URL with the API token masked, for logging.
    pub fn redacted_url(&self, params: &QueryParameters) -> String {
        self.latest_data_url(params).replace(
            &format!("token={}", urlencoding::encode(&self.token)),
            "token=***API_KEY***",
        )
    }

    /// Issue a single GET for `query`. Nothing is retried.
    pub async fn fetch(&self, query: &StructuredQuery) -> Result<ProviderResponse, FetchError> {
        if query.endpoint != LATEST_DATA_ENDPOINT {
            warn!(
                "Ignoring unsupported endpoint '{}', using {}",
                query.endpoint, LATEST_DATA_ENDPOINT
            );
        }

        let url = self.latest_data_url(&query.parameters);
        info!("Calling Sofar API: {}", self.redacted_url(&query.parameters));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        info!("Received Sofar response status: {}", status);

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read Sofar error body: {}", e);
                    String::new()
                }
            };
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body
            };
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        debug!("Sofar response body: {}", body);

        let data: ProviderResponse = serde_json::from_str(&body)?;
        Ok(data)
    }
}

pub fn encode_query(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
