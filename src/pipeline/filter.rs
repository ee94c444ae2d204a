use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::ProviderResponse;
use super::rules::{self, Category};

/// Keyword-narrowed subset of a provider response. Only these four keys can
/// ever appear when serialized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waves: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.wind.is_none()
            && self.waves.is_none()
            && self.battery_voltage.is_none()
            && self.humidity.is_none()
    }
}

/// Narrow `response` to the categories mentioned in `prompt`. A category is
/// kept only when the prompt asks for it and the provider returned it in the
/// expected shape; anything else is dropped silently.
pub fn filter_response(prompt: &str, response: &ProviderResponse) -> FilteredView {
    let mut view = FilteredView::default();

    for category in rules::categories_for(prompt) {
        let field = category.field();
        let kept = match category {
            Category::Wind => {
                view.wind = response.first_reading(field).cloned();
                view.wind.is_some()
            }
            Category::Waves => {
                view.waves = response.first_reading(field).cloned();
                view.waves.is_some()
            }
            Category::BatteryVoltage => {
                view.battery_voltage = response.number(field);
                view.battery_voltage.is_some()
            }
            Category::Humidity => {
                view.humidity = response.number(field);
                view.humidity.is_some()
            }
        };
        if !kept {
            debug!("Requested {} not present in provider response", field);
        }
    }

    view
}
