use std::env;
use std::fmt;

use thiserror::Error;

use crate::pipeline::DEFAULT_SPOTTER_ID;
use crate::pipeline::fetcher::SOFAR_BASE_URL;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingSecret(&'static str),

    #[error("PORT must be a valid number, got {0:?}")]
    InvalidPort(String),
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub sofar_api_key: String,
    pub sofar_base_url: String,
    pub spotter_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source. Both API keys
    /// are required; everything else has a default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let secret = |key: &'static str| var(key).ok_or(ConfigError::MissingSecret(key));

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 5050,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            openai_api_key: secret("OPENAI_API_KEY")?,
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            sofar_api_key: secret("SOFAR_API_KEY")?,
            sofar_base_url: var("SOFAR_BASE_URL").unwrap_or_else(|| SOFAR_BASE_URL.to_string()),
            spotter_id: var("SOFAR_SPOTTER_ID").unwrap_or_else(|| DEFAULT_SPOTTER_ID.to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

// Keys stay out of the startup log.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("openai_api_key", &"***")
            .field("openai_model", &self.openai_model)
            .field("sofar_api_key", &"***")
            .field("sofar_base_url", &self.sofar_base_url)
            .field("spotter_id", &self.spotter_id)
            .finish()
    }
}
