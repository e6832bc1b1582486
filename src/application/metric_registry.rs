// Metric registry - Static catalog of metric definitions
use crate::domain::component::ComponentType;
use crate::domain::metric::{AggregationKind, MetricDefinition, ValueFormat};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone)]
pub struct MetricRegistry {
    metrics: Vec<MetricDefinition>,
}

impl MetricRegistry {
    /// Build a registry from explicit definitions. Later duplicates of an id are ignored.
    pub fn from_definitions(definitions: Vec<MetricDefinition>) -> Self {
        let mut metrics: Vec<MetricDefinition> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if metrics.iter().any(|m| m.id == definition.id) {
                tracing::warn!("Ignoring duplicate metric definition {}", definition.id);
                continue;
            }
            metrics.push(definition);
        }
        Self { metrics }
    }

    /// The built-in catalog, populated once on first use
    pub fn builtin() -> Arc<MetricRegistry> {
        static BUILTIN: OnceLock<Arc<MetricRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| Arc::new(MetricRegistry::from_definitions(builtin_metrics())))
            .clone()
    }

    pub fn all(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    pub fn get(&self, id: &str) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.id == id)
    }

    pub fn by_context(&self, context: &str) -> Vec<&MetricDefinition> {
        self.metrics.iter().filter(|m| m.context == context).collect()
    }

    /// Metrics the given chart type may draw, including unrestricted ones
    pub fn by_chart_type(&self, chart_type: ComponentType) -> Vec<&MetricDefinition> {
        self.metrics.iter().filter(|m| m.supports(chart_type)).collect()
    }

    /// Distinct context tags in catalog order
    pub fn contexts(&self) -> Vec<&str> {
        let mut contexts: Vec<&str> = Vec::new();
        for metric in &self.metrics {
            if !contexts.contains(&metric.context.as_str()) {
                contexts.push(&metric.context);
            }
        }
        contexts
    }
}

const SERIES_CHARTS: [ComponentType; 9] = [
    ComponentType::Value,
    ComponentType::Trend,
    ComponentType::Sparkline,
    ComponentType::BarChart,
    ComponentType::LineChart,
    ComponentType::AreaChart,
    ComponentType::ComposedChart,
    ComponentType::Table,
    ComponentType::StackedBarChart,
];

const BREAKDOWN_CHARTS: [ComponentType; 8] = [
    ComponentType::PieChart,
    ComponentType::DonutChart,
    ComponentType::Treemap,
    ComponentType::FunnelChart,
    ComponentType::RadarChart,
    ComponentType::HorizontalBarChart,
    ComponentType::BarChart,
    ComponentType::Table,
];

const RATE_CHARTS: [ComponentType; 6] = [
    ComponentType::Value,
    ComponentType::Trend,
    ComponentType::Gauge,
    ComponentType::Progress,
    ComponentType::RadialBarChart,
    ComponentType::LineChart,
];

fn with_lists(lists: &[&[ComponentType]]) -> Vec<ComponentType> {
    let mut merged: Vec<ComponentType> = Vec::new();
    for list in lists {
        for chart in list.iter() {
            if !merged.contains(chart) {
                merged.push(*chart);
            }
        }
    }
    merged
}

fn builtin_metrics() -> Vec<MetricDefinition> {
    let series_and_breakdown = with_lists(&[&SERIES_CHARTS[..], &BREAKDOWN_CHARTS[..]]);
    let counts = with_lists(&[
        &SERIES_CHARTS[..],
        &BREAKDOWN_CHARTS[..],
        &[ComponentType::ScatterChart, ComponentType::Progress][..],
    ]);

    vec![
        // financeiro
        MetricDefinition::new("receita_total", "Receita total", AggregationKind::Sum, "amount", "financeiro")
            .with_chart_types(&series_and_breakdown)
            .with_format(ValueFormat::Currency)
            .with_icon("dollar-sign"),
        MetricDefinition::new("despesa_total", "Despesa total", AggregationKind::Sum, "expense", "financeiro")
            .with_chart_types(&series_and_breakdown)
            .with_format(ValueFormat::Currency)
            .with_icon("receipt"),
        MetricDefinition::new("ticket_medio", "Ticket médio", AggregationKind::Avg, "amount", "financeiro")
            .with_chart_types(&SERIES_CHARTS)
            .with_format(ValueFormat::Currency)
            .with_icon("tag"),
        MetricDefinition::new("maior_pagamento", "Maior pagamento", AggregationKind::Max, "amount", "financeiro")
            .with_chart_types(&[ComponentType::Value, ComponentType::Table, ComponentType::BarChart])
            .with_format(ValueFormat::Currency)
            .with_icon("arrow-up"),
        MetricDefinition::new("menor_pagamento", "Menor pagamento", AggregationKind::Min, "amount", "financeiro")
            .with_chart_types(&[ComponentType::Value, ComponentType::Table, ComponentType::BarChart])
            .with_format(ValueFormat::Currency)
            .with_icon("arrow-down"),
        MetricDefinition::new("pagamento_mediano", "Pagamento mediano", AggregationKind::Median, "amount", "financeiro")
            .with_chart_types(&[ComponentType::Value, ComponentType::Trend])
            .with_format(ValueFormat::Currency)
            .with_icon("divide"),
        MetricDefinition::new("inadimplencia", "Inadimplência", AggregationKind::Sum, "overdue_amount", "financeiro")
            .with_chart_types(&series_and_breakdown)
            .with_format(ValueFormat::Currency)
            .with_icon("alert-triangle"),
        // operacional
        MetricDefinition::new("ocorrencias", "Ocorrências", AggregationKind::Count, "id", "operacional")
            .with_chart_types(&counts)
            .with_format(ValueFormat::Integer)
            .with_icon("clipboard"),
        MetricDefinition::new("tempo_medio_atendimento", "Tempo médio de atendimento", AggregationKind::Avg, "duration_minutes", "operacional")
            .with_chart_types(&[ComponentType::Value, ComponentType::Trend, ComponentType::LineChart, ComponentType::BarChart, ComponentType::Gauge])
            .with_format(ValueFormat::Duration)
            .with_icon("clock"),
        MetricDefinition::new("taxa_ocupacao", "Taxa de ocupação", AggregationKind::Avg, "occupancy_rate", "operacional")
            .with_chart_types(&RATE_CHARTS)
            .with_format(ValueFormat::Percent)
            .with_icon("home"),
        // clientes
        MetricDefinition::new("novos_clientes", "Novos clientes", AggregationKind::Count, "id", "clientes")
            .with_chart_types(&counts)
            .with_format(ValueFormat::Integer)
            .with_icon("user-plus"),
        MetricDefinition::new("satisfacao_media", "Satisfação média", AggregationKind::Avg, "rating", "clientes")
            .with_chart_types(&[ComponentType::Value, ComponentType::Trend, ComponentType::Gauge, ComponentType::RadarChart, ComponentType::BarChart])
            .with_format(ValueFormat::Number)
            .with_icon("star"),
        // agendamentos
        MetricDefinition::new("consultas_agendadas", "Consultas agendadas", AggregationKind::Count, "id", "agendamentos")
            .with_chart_types(&counts)
            .with_format(ValueFormat::Integer)
            .with_icon("calendar"),
        // Older dashboards bound this before chart lists existed; any chart may draw it
        MetricDefinition::new("registros", "Registros", AggregationKind::Count, "id", "geral")
            .with_format(ValueFormat::Integer)
            .with_icon("database"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = MetricRegistry::builtin();
        let metric = registry.get("receita_total").unwrap();
        assert_eq!(metric.aggregation, AggregationKind::Sum);
        assert_eq!(metric.value_field, "amount");
        assert!(registry.get("nao_existe").is_none());
    }

    #[test]
    fn test_builtin_ids_unique() {
        let registry = MetricRegistry::builtin();
        assert_eq!(registry.all().len(), builtin_metrics().len());
    }

    #[test]
    fn test_by_context() {
        let registry = MetricRegistry::builtin();
        let finance = registry.by_context("financeiro");
        assert!(finance.len() >= 5);
        assert!(finance.iter().all(|m| m.context == "financeiro"));
        assert!(registry.by_context("juridico").is_empty());
        assert_eq!(registry.contexts()[0], "financeiro");
    }

    #[test]
    fn test_by_chart_type_includes_unrestricted() {
        let registry = MetricRegistry::builtin();
        let gauges = registry.by_chart_type(ComponentType::Gauge);
        assert!(gauges.iter().any(|m| m.id == "taxa_ocupacao"));
        assert!(gauges.iter().any(|m| m.id == "registros"));
        assert!(!gauges.iter().any(|m| m.id == "receita_total"));
    }

    #[test]
    fn test_duplicates_ignored() {
        let registry = MetricRegistry::from_definitions(vec![
            MetricDefinition::new("a", "First", AggregationKind::Sum, "v", "x"),
            MetricDefinition::new("a", "Second", AggregationKind::Avg, "v", "x"),
        ]);
        assert_eq!(registry.all().len(), 1);
        assert_eq!(registry.get("a").unwrap().name, "First");
    }
}
