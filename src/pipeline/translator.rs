use std::sync::Arc;

use async_trait::async_trait;
use rig::{completion::Prompt, providers::openai};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::rules;
use super::{LATEST_DATA_ENDPOINT, QueryShapeError, StructuredQuery};

/// Text-completion backend used to translate prompts.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, instruction: &str, prompt: &str) -> anyhow::Result<String>;
}

/// OpenAI chat completions through rig, sampled at temperature zero.
pub struct OpenAiCompletion {
    client: openai::Client,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, instruction: &str, prompt: &str) -> anyhow::Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(instruction)
            .temperature(0.0)
            .build();
        let response = agent.prompt(prompt.to_string()).await?;
        Ok(response)
    }
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Completion service call failed: {0}")]
    Completion(String),

    #[error("Failed to parse AI output as JSON: {message}")]
    Unparsable { message: String, raw_output: String },

    #[error("AI output is missing the parameters field")]
    MissingParameters { raw_output: String },
}

impl TranslationError {
    /// Model text that caused the failure, when there was any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            TranslationError::Completion(_) => None,
            TranslationError::Unparsable { raw_output, .. }
            | TranslationError::MissingParameters { raw_output } => Some(raw_output),
        }
    }
}

pub struct QueryTranslator {
    completion: Arc<dyn CompletionService>,
    instruction: String,
    default_spotter_id: String,
}

impl QueryTranslator {
    pub fn new(completion: Arc<dyn CompletionService>, default_spotter_id: impl Into<String>) -> Self {
        let default_spotter_id = default_spotter_id.into();
        Self {
            completion,
            instruction: build_instruction(&default_spotter_id),
            default_spotter_id,
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Translate a free-text prompt into a structured latest-data query.
    pub async fn translate(&self, prompt: &str) -> Result<StructuredQuery, TranslationError> {
        let raw_output = self
            .completion
            .complete(&self.instruction, prompt)
            .await
            .map_err(|e| TranslationError::Completion(e.to_string()))?;
        debug!("Raw completion output: {}", raw_output);

        let mut query = parse_structured_query(&raw_output)?;

        let spotter_id = query
            .parameters
            .spotter_id_or(&self.default_spotter_id)
            .to_string();
        query.parameters.spotter_id = Some(spotter_id);

        for flag in rules::flags_for(prompt) {
            if !query.parameters.is_set(flag) {
                warn!(
                    "AI output left {} unset although the prompt mentions it, enabling it",
                    flag.param_name()
                );
                query.parameters.set(flag, true);
            }
        }

        info!(
            "Translated prompt into query for spotter {}",
            query.parameters.spotter_id_or(&self.default_spotter_id)
        );
        Ok(query)
    }
}

/// Parse completion text strictly as a [`StructuredQuery`].
pub fn parse_structured_query(raw_output: &str) -> Result<StructuredQuery, TranslationError> {
    let text = strip_code_fence(raw_output.trim());

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| TranslationError::Unparsable {
            message: e.to_string(),
            raw_output: raw_output.to_string(),
        })?;

    StructuredQuery::from_json(value).map_err(|e| match e {
        QueryShapeError::MissingParameters => TranslationError::MissingParameters {
            raw_output: raw_output.to_string(),
        },
        QueryShapeError::Invalid(message) => TranslationError::Unparsable {
            message,
            raw_output: raw_output.to_string(),
        },
    })
}

// Models sometimes wrap JSON in a markdown fence despite being told not to.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

fn build_instruction(default_spotter_id: &str) -> String {
    let rule_lines = rules::instruction_lines().join("\n");
    format!(
        r#"You are an AI that converts natural-language requests into JSON for Sofar's '{endpoint}' API.
Respond with JSON in this format:
{{
  "endpoint": "{endpoint}",
  "parameters": {{
    "spotterId": "{spotter}",
    "processingSources": "embedded",
    "includeWindData": false,
    "includeSurfaceTempData": false,
    "includeBatteryStatus": false,
    "includeDirectionalMoments": false,
    "realTimeOnly": true
  }}
}}

Rules:
- Default spotterId = "{spotter}" unless specified by user.
{rule_lines}
- Only output valid JSON.
"#,
        endpoint = LATEST_DATA_ENDPOINT,
        spotter = default_spotter_id,
    )
}
