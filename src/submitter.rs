//! Client side of the pipeline: submit a prompt, chain the two backend calls,
//! filter the result locally and keep track of what to show.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::pipeline::{FilteredView, ProviderResponse, StructuredQuery, filter_response};

pub const NO_MATCHING_DATA: &str = "No matching data found for your request.";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please enter a question first")]
    EmptyPrompt,

    #[error("A request is already in progress")]
    InFlight,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The two calls a submission makes, in order.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn generate_query(&self, prompt: &str) -> Result<StructuredQuery, BackendError>;
    async fn fetch_data(&self, query: &StructuredQuery) -> Result<ProviderResponse, BackendError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Ready(FilteredView),
}

pub struct PromptSubmitter<B> {
    backend: B,
    in_flight: AtomicBool,
    state: Mutex<SubmissionState>,
}

impl<B: QueryBackend> PromptSubmitter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    /// Whether a submission of `prompt` would be accepted right now.
    pub fn can_submit(&self, prompt: &str) -> bool {
        !prompt.trim().is_empty() && !self.in_flight.load(Ordering::Acquire)
    }

    pub async fn state(&self) -> SubmissionState {
        self.state.lock().await.clone()
    }

    pub async fn render(&self) -> String {
        render(&*self.state.lock().await)
    }

    /// Run one prompt through translate, fetch and filter. Overlapping
    /// submissions are refused. The in-flight flag is cleared when the call
    /// finishes or its future is dropped.
    pub async fn submit(&self, prompt: &str) -> Result<FilteredView, SubmitError> {
        if prompt.trim().is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }
        if self.in_flight.swap(true, Ordering::AcqRel) {
            warn!("Ignoring submission while another request is in flight");
            return Err(SubmitError::InFlight);
        }
        let _in_flight = InFlightGuard(&self.in_flight);

        *self.state.lock().await = SubmissionState::Loading;

        let outcome = self.run(prompt).await;

        *self.state.lock().await = match &outcome {
            Ok(view) => SubmissionState::Ready(view.clone()),
            Err(e) => SubmissionState::Failed(e.to_string()),
        };

        outcome
    }

    async fn run(&self, prompt: &str) -> Result<FilteredView, SubmitError> {
        let query = self.backend.generate_query(prompt).await?;
        info!("Received structured query for endpoint {}", query.endpoint);

        let response = self.backend.fetch_data(&query).await?;
        Ok(filter_response(prompt, &response))
    }
}

/// Clears the in-flight flag when dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub fn render(state: &SubmissionState) -> String {
    match state {
        SubmissionState::Idle => String::new(),
        SubmissionState::Loading => "Loading...".to_string(),
        SubmissionState::Failed(message) => format!("Error: {}", message),
        SubmissionState::Ready(view) if view.is_empty() => NO_MATCHING_DATA.to_string(),
        SubmissionState::Ready(view) => render_view(view),
    }
}

fn render_view(view: &FilteredView) -> String {
    let mut lines = Vec::new();
    if let Some(wind) = &view.wind {
        lines.push(format!("Wind: {}", wind));
    }
    if let Some(waves) = &view.waves {
        lines.push(format!("Waves: {}", waves));
    }
    if let Some(voltage) = view.battery_voltage {
        lines.push(format!("Battery voltage: {} V", voltage));
    }
    if let Some(humidity) = view.humidity {
        lines.push(format!("Humidity: {}%", humidity));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::QueryParameters;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct FakeBackend {
        response: serde_json::Value,
        fail_translation: bool,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn returning(response: serde_json::Value) -> Self {
            Self {
                response,
                fail_translation: false,
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl QueryBackend for FakeBackend {
        async fn generate_query(&self, _prompt: &str) -> Result<StructuredQuery, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_translation {
                return Err(BackendError::Rejected {
                    status: 500,
                    message: "Failed to parse AI output as JSON".to_string(),
                });
            }
            Ok(StructuredQuery::new(QueryParameters::default()))
        }

        async fn fetch_data(
            &self,
            _query: &StructuredQuery,
        ) -> Result<ProviderResponse, BackendError> {
            Ok(ProviderResponse(self.response.clone()))
        }
    }

    #[tokio::test]
    async fn test_submit_filters_and_renders() {
        let submitter = PromptSubmitter::new(FakeBackend::returning(json!({
            "data": { "wind": [{ "speed": 7.1 }], "batteryVoltage": 4.0 }
        })));

        let view = submitter.submit("Wind please").await.unwrap();
        assert_eq!(view.wind, Some(json!({ "speed": 7.1 })));
        assert_eq!(view.battery_voltage, None);

        assert_eq!(submitter.state().await, SubmissionState::Ready(view));
        assert_eq!(submitter.render().await, r#"Wind: {"speed":7.1}"#);
        assert!(submitter.can_submit("again"));
    }

    #[tokio::test]
    async fn test_no_matching_data_notice() {
        let submitter = PromptSubmitter::new(FakeBackend::returning(json!({ "data": {} })));

        let view = submitter.submit("humidity?").await.unwrap();
        assert!(view.is_empty());
        assert_eq!(submitter.render().await, NO_MATCHING_DATA);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_refused() {
        let backend = FakeBackend::returning(json!({}));
        let submitter = PromptSubmitter::new(backend);

        assert!(!submitter.can_submit("  "));
        assert!(matches!(
            submitter.submit("  ").await,
            Err(SubmitError::EmptyPrompt)
        ));
        assert_eq!(submitter.state().await, SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_failure_is_shown_and_submission_reenabled() {
        let mut backend = FakeBackend::returning(json!({}));
        backend.fail_translation = true;
        let submitter = PromptSubmitter::new(backend);

        let err = submitter.submit("wind").await.unwrap_err();
        assert!(matches!(err, SubmitError::Backend(_)));
        assert_eq!(
            submitter.render().await,
            "Error: Failed to parse AI output as JSON (status 500)"
        );
        assert!(submitter.can_submit("wind"));
    }

    #[tokio::test]
    async fn test_overlapping_submission_is_refused() {
        let gate = Arc::new(Notify::new());
        let mut backend = FakeBackend::returning(json!({ "data": { "humidity": 50 } }));
        backend.gate = Some(gate.clone());
        let submitter = Arc::new(PromptSubmitter::new(backend));

        let first = tokio::spawn({
            let submitter = submitter.clone();
            async move { submitter.submit("humidity").await }
        });

        while submitter.backend.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(submitter.state().await, SubmissionState::Loading);
        assert_eq!(submitter.render().await, "Loading...");
        assert!(!submitter.can_submit("humidity"));
        assert!(matches!(
            submitter.submit("humidity").await,
            Err(SubmitError::InFlight)
        ));

        gate.notify_one();
        let view = first.await.unwrap().unwrap();
        assert_eq!(view.humidity, Some(50.0));
        assert_eq!(submitter.backend.calls.load(Ordering::SeqCst), 1);
        assert!(submitter.can_submit("humidity"));
    }

    #[tokio::test]
    async fn test_cancelled_submission_reenables_submit() {
        let gate = Arc::new(Notify::new());
        let mut backend = FakeBackend::returning(json!({ "data": { "humidity": 42 } }));
        backend.gate = Some(gate.clone());
        let submitter = PromptSubmitter::new(backend);

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            submitter.submit("humidity"),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(submitter.can_submit("humidity"));

        gate.notify_one();
        let view = submitter.submit("humidity").await.unwrap();
        assert_eq!(view.humidity, Some(42.0));
    }
}
