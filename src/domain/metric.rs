// Metric domain model
use super::component::ComponentType;
use serde::{Deserialize, Serialize};

/// Reduction applied to the values of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Median,
}

impl AggregationKind {
    /// Reduce a bucket of rows.
    ///
    /// `values` holds one entry per row; `None` marks a missing or non-numeric
    /// field. Missing values count as 0 for `sum`, and are left out of the
    /// denominator for `avg`, `min`, `max` and `median`.
    pub fn reduce(&self, values: &[Option<f64>]) -> f64 {
        match self {
            AggregationKind::Count => values.len() as f64,
            AggregationKind::Sum => values.iter().map(|v| v.unwrap_or(0.0)).sum(),
            AggregationKind::Avg => {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                if present.is_empty() {
                    0.0
                } else {
                    present.iter().sum::<f64>() / present.len() as f64
                }
            }
            AggregationKind::Min => values
                .iter()
                .flatten()
                .copied()
                .reduce(f64::min)
                .unwrap_or(0.0),
            AggregationKind::Max => values
                .iter()
                .flatten()
                .copied()
                .reduce(f64::max)
                .unwrap_or(0.0),
            AggregationKind::Median => {
                let mut present: Vec<f64> = values.iter().flatten().copied().collect();
                if present.is_empty() {
                    return 0.0;
                }
                present.sort_by(|a, b| a.total_cmp(b));
                let mid = present.len() / 2;
                if present.len() % 2 == 0 {
                    (present[mid - 1] + present[mid]) / 2.0
                } else {
                    present[mid]
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationKind::Count => "count",
            AggregationKind::Sum => "sum",
            AggregationKind::Avg => "avg",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Median => "median",
        }
    }
}

/// How a metric's value is displayed by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    #[default]
    Number,
    Integer,
    Currency,
    Percent,
    Duration,
}

/// A catalogued metric. Defined once at load time and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: String,
    pub name: String,
    pub aggregation: AggregationKind,
    pub value_field: String,
    /// Chart types able to draw this metric. Empty means unrestricted.
    #[serde(default)]
    pub chart_types: Vec<ComponentType>,
    #[serde(default)]
    pub format: ValueFormat,
    pub icon: String,
    pub context: String,
}

impl MetricDefinition {
    pub fn new(
        id: &str,
        name: &str,
        aggregation: AggregationKind,
        value_field: &str,
        context: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            aggregation,
            value_field: value_field.to_string(),
            chart_types: Vec::new(),
            format: ValueFormat::Number,
            icon: "chart".to_string(),
            context: context.to_string(),
        }
    }

    pub fn with_chart_types(mut self, chart_types: &[ComponentType]) -> Self {
        self.chart_types = chart_types.to_vec();
        self
    }

    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    /// Whether `chart_type` may draw this metric. An empty allow-list accepts everything.
    pub fn supports(&self, chart_type: ComponentType) -> bool {
        self.chart_types.is_empty() || self.chart_types.contains(&chart_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_avg() {
        let values = [Some(10.0), Some(20.0), Some(30.0)];
        assert_eq!(AggregationKind::Sum.reduce(&values), 60.0);
        assert_eq!(AggregationKind::Avg.reduce(&values), 20.0);
        assert_eq!(AggregationKind::Count.reduce(&values), 3.0);
    }

    #[test]
    fn test_missing_values() {
        let values = [Some(4.0), None, Some(8.0)];
        assert_eq!(AggregationKind::Sum.reduce(&values), 12.0);
        assert_eq!(AggregationKind::Avg.reduce(&values), 6.0);
        assert_eq!(AggregationKind::Count.reduce(&values), 3.0);
        assert_eq!(AggregationKind::Min.reduce(&values), 4.0);
        assert_eq!(AggregationKind::Max.reduce(&values), 8.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(AggregationKind::Median.reduce(&[Some(3.0), Some(1.0), Some(2.0)]), 2.0);
        assert_eq!(
            AggregationKind::Median.reduce(&[Some(4.0), Some(1.0), None, Some(3.0), Some(2.0)]),
            2.5
        );
        assert_eq!(AggregationKind::Median.reduce(&[None]), 0.0);
    }

    #[test]
    fn test_supports_empty_allow_list() {
        let legacy = MetricDefinition::new("legacy", "Legacy", AggregationKind::Count, "id", "ops");
        assert!(legacy.supports(ComponentType::PieChart));

        let strict = legacy.with_chart_types(&[ComponentType::Value]);
        assert!(strict.supports(ComponentType::Value));
        assert!(!strict.supports(ComponentType::PieChart));
        assert_eq!(strict.format, ValueFormat::Number);
    }
}
