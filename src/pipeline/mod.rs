pub mod fetcher;
pub mod filter;
pub mod rules;
pub mod translator;

pub use fetcher::{FetchError, SofarClient};
pub use filter::{FilteredView, filter_response};
pub use translator::{CompletionService, OpenAiCompletion, QueryTranslator, TranslationError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The only provider endpoint a structured query may target.
pub const LATEST_DATA_ENDPOINT: &str = "latest-data";

/// Spotter buoy used when neither the user nor the configuration names one.
pub const DEFAULT_SPOTTER_ID: &str = "SPOT-30344R";

fn default_endpoint() -> String {
    LATEST_DATA_ENDPOINT.to_string()
}

// -- data structures that travel through the pipeline

/// Schema-conformant output of the translation step, also accepted verbatim
/// by the sofar-call endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StructuredQuery {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub parameters: QueryParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_sources: Option<String>,
    #[serde(default)]
    pub include_wind_data: bool,
    #[serde(default)]
    pub include_surface_temp_data: bool,
    #[serde(default)]
    pub include_battery_status: bool,
    #[serde(default)]
    pub include_directional_moments: bool,
    #[serde(default)]
    pub real_time_only: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum QueryShapeError {
    #[error("query has no parameters")]
    MissingParameters,

    #[error("invalid query: {0}")]
    Invalid(String),
}

impl StructuredQuery {
    pub fn new(parameters: QueryParameters) -> Self {
        Self {
            endpoint: default_endpoint(),
            parameters,
        }
    }

    /// Validate an untyped JSON value against the query schema.
    /// A missing or null `parameters` field is reported separately from
    /// other shape problems so callers can treat it as missing input.
    pub fn from_json(value: Value) -> Result<Self, QueryShapeError> {
        if !value.is_object() {
            return Err(QueryShapeError::Invalid(
                "query must be a JSON object".to_string(),
            ));
        }
        if value.get("parameters").is_none_or(Value::is_null) {
            return Err(QueryShapeError::MissingParameters);
        }
        serde_json::from_value(value).map_err(|e| QueryShapeError::Invalid(e.to_string()))
    }
}

impl QueryParameters {
    /// Spotter id to query, falling back to `default` when absent or blank.
    pub fn spotter_id_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.spotter_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => default,
        }
    }

    pub fn is_set(&self, flag: QueryFlag) -> bool {
        match flag {
            QueryFlag::WindData => self.include_wind_data,
            QueryFlag::SurfaceTempData => self.include_surface_temp_data,
            QueryFlag::BatteryStatus => self.include_battery_status,
            QueryFlag::DirectionalMoments => self.include_directional_moments,
            QueryFlag::RealTimeOnly => self.real_time_only,
        }
    }

    pub fn set(&mut self, flag: QueryFlag, value: bool) {
        let slot = match flag {
            QueryFlag::WindData => &mut self.include_wind_data,
            QueryFlag::SurfaceTempData => &mut self.include_surface_temp_data,
            QueryFlag::BatteryStatus => &mut self.include_battery_status,
            QueryFlag::DirectionalMoments => &mut self.include_directional_moments,
            QueryFlag::RealTimeOnly => &mut self.real_time_only,
        };
        *slot = value;
    }
}

/// Boolean capability flags understood by the latest-data endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFlag {
    WindData,
    SurfaceTempData,
    BatteryStatus,
    DirectionalMoments,
    RealTimeOnly,
}

impl QueryFlag {
    /// Query-string order.
    pub const ALL: [QueryFlag; 5] = [
        QueryFlag::WindData,
        QueryFlag::SurfaceTempData,
        QueryFlag::BatteryStatus,
        QueryFlag::DirectionalMoments,
        QueryFlag::RealTimeOnly,
    ];

    pub fn param_name(self) -> &'static str {
        match self {
            QueryFlag::WindData => "includeWindData",
            QueryFlag::SurfaceTempData => "includeSurfaceTempData",
            QueryFlag::BatteryStatus => "includeBatteryStatus",
            QueryFlag::DirectionalMoments => "includeDirectionalMoments",
            QueryFlag::RealTimeOnly => "realTimeOnly",
        }
    }
}

/// Loosely typed provider payload. No schema is enforced; every lookup is
/// guarded and a missing or oddly shaped field reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ProviderResponse(pub Value);

impl ProviderResponse {
    /// Look a field up inside the `data` envelope first, then at the top level.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0
            .get("data")
            .and_then(|data| data.get(name))
            .or_else(|| self.0.get(name))
    }

    /// First element of a non-empty array field, in provider order.
    pub fn first_reading(&self, name: &str) -> Option<&Value> {
        self.field(name)?.as_array()?.first()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name)?.as_f64()
    }
}
