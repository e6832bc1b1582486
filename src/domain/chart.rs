// Resolved chart data
use serde::{Deserialize, Serialize};

/// One record of the tabular data source. Missing fields are treated as absent.
pub type TabularRow = serde_json::Map<String, serde_json::Value>;

/// One resolved point. Order within a series is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ChartDataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            previous_value: None,
            timestamp: None,
            category: None,
        }
    }

    pub fn with_previous(mut self, previous_value: f64) -> Self {
        self.previous_value = Some(previous_value);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Relative change from `previous` to `current`, in percent. `None` when `previous` is zero.
pub fn change_percent(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}
