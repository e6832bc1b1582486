// Chart compatibility - Which chart types may draw which metrics
use crate::application::metric_registry::MetricRegistry;
use crate::domain::component::ComponentType;
use crate::domain::metric::MetricDefinition;
use std::sync::Arc;

/// Advisory gate for the editor palette. Rendering never consults it.
#[derive(Debug, Clone)]
pub struct CompatibilityChecker {
    metrics: Arc<MetricRegistry>,
}

impl CompatibilityChecker {
    pub fn new(metrics: Arc<MetricRegistry>) -> Self {
        Self { metrics }
    }

    /// A metric without a chart list accepts any chart; an unknown metric accepts none
    pub fn is_compatible(&self, chart_type: ComponentType, metric_id: &str) -> bool {
        self.metrics
            .get(metric_id)
            .is_some_and(|metric| metric.supports(chart_type))
    }

    pub fn compatible_chart_types(&self, metric_id: &str) -> Vec<ComponentType> {
        match self.metrics.get(metric_id) {
            Some(metric) => ComponentType::ALL
                .into_iter()
                .filter(|t| t.is_data_bound() && metric.supports(*t))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn compatible_metrics(&self, chart_type: ComponentType) -> Vec<&MetricDefinition> {
        if !chart_type.is_data_bound() {
            return Vec::new();
        }
        self.metrics.by_chart_type(chart_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::AggregationKind;

    fn checker() -> CompatibilityChecker {
        CompatibilityChecker::new(Arc::new(MetricRegistry::from_definitions(vec![
            MetricDefinition::new("kpi", "KPI", AggregationKind::Sum, "v", "x")
                .with_chart_types(&[ComponentType::Value, ComponentType::Trend]),
            MetricDefinition::new("legacy", "Legacy", AggregationKind::Count, "v", "x"),
        ])))
    }

    #[test]
    fn test_allow_list_gate() {
        let checker = checker();
        assert!(!checker.is_compatible(ComponentType::PieChart, "kpi"));
        assert!(checker.is_compatible(ComponentType::Value, "kpi"));
        assert!(checker.is_compatible(ComponentType::Trend, "kpi"));
    }

    #[test]
    fn test_empty_list_is_permissive() {
        let checker = checker();
        assert!(ComponentType::ALL.iter().all(|t| checker.is_compatible(*t, "legacy")));
    }

    #[test]
    fn test_unknown_metric_is_incompatible() {
        let checker = checker();
        assert!(!checker.is_compatible(ComponentType::Value, "missing"));
        assert!(checker.compatible_chart_types("missing").is_empty());
    }

    #[test]
    fn test_palette_lists() {
        let checker = checker();
        assert_eq!(
            checker.compatible_chart_types("kpi"),
            vec![ComponentType::Value, ComponentType::Trend]
        );
        let legacy = checker.compatible_chart_types("legacy");
        assert_eq!(legacy.len(), ComponentType::ALL.len() - 1);
        assert!(!legacy.contains(&ComponentType::Text));

        let pies: Vec<&str> = checker
            .compatible_metrics(ComponentType::PieChart)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(pies, ["legacy"]);
        assert!(checker.compatible_metrics(ComponentType::Text).is_empty());
    }
}
