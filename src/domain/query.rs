// Metrics query model
use super::metric::AggregationKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    In,
    NotIn,
    Between,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl FilterCondition {
    pub fn new(field: &str, operator: FilterOperator, value: serde_json::Value) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    #[default]
    And,
    Or,
}

/// Conditions combined with a single logic operator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub logic: FilterLogic,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
}

impl FilterGroup {
    pub fn all(conditions: Vec<FilterCondition>) -> Self {
        Self {
            logic: FilterLogic::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<FilterCondition>) -> Self {
        Self {
            logic: FilterLogic::Or,
            conditions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatePreset {
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_3_months")]
    Last3Months,
    #[serde(rename = "last_year")]
    LastYear,
    #[serde(rename = "custom")]
    Custom,
}

/// Date window applied to the timestamp field.
///
/// Presets are resolved to instants when the query runs; only `custom` keeps
/// explicit bounds, which are parsed at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub preset: DatePreset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl DateRange {
    pub fn preset(preset: DatePreset) -> Self {
        Self {
            preset,
            start: None,
            end: None,
        }
    }

    pub fn custom(start: &str, end: &str) -> Self {
        Self {
            preset: DatePreset::Custom,
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }
}

/// Declarative query bound to one canvas component
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Overrides the metric's own aggregation when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl MetricsQuery {
    pub fn for_metric(metric: &str) -> Self {
        Self {
            metric: Some(metric.to_string()),
            ..Default::default()
        }
    }

    pub fn with_aggregation(mut self, aggregation: AggregationKind) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_dimension(mut self, dimension: &str) -> Self {
        self.dimension = Some(dimension.to_string());
        self
    }

    pub fn with_filters(mut self, filters: FilterGroup) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = Some(date_range);
        self
    }

    /// The bound metric id, treating a blank id as unbound
    pub fn metric_id(&self) -> Option<&str> {
        self.metric
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn dimension_id(&self) -> Option<&str> {
        self.dimension
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
