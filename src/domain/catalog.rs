// Component palette metadata for the editor
use super::component::ComponentType;
use super::geometry::GridSize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Kpi,
    Chart,
    Table,
    Content,
}

/// One entry of the "add component" palette
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub label: &'static str,
    pub category: ComponentCategory,
}

pub fn catalog() -> Vec<CatalogEntry> {
    ComponentType::ALL
        .into_iter()
        .map(|component_type| CatalogEntry {
            component_type,
            label: label(component_type),
            category: category(component_type),
        })
        .collect()
}

pub fn label(component_type: ComponentType) -> &'static str {
    match component_type {
        ComponentType::Value => "Valor",
        ComponentType::Trend => "Tendência",
        ComponentType::Table => "Tabela",
        ComponentType::Text => "Texto",
        ComponentType::Progress => "Progresso",
        ComponentType::Gauge => "Medidor",
        ComponentType::Sparkline => "Minigráfico",
        ComponentType::BarChart => "Barras",
        ComponentType::HorizontalBarChart => "Barras horizontais",
        ComponentType::StackedBarChart => "Barras empilhadas",
        ComponentType::LineChart => "Linhas",
        ComponentType::AreaChart => "Área",
        ComponentType::PieChart => "Pizza",
        ComponentType::DonutChart => "Rosca",
        ComponentType::RadarChart => "Radar",
        ComponentType::RadialBarChart => "Barras radiais",
        ComponentType::ScatterChart => "Dispersão",
        ComponentType::ComposedChart => "Composto",
        ComponentType::Treemap => "Mapa de árvore",
        ComponentType::FunnelChart => "Funil",
    }
}

pub fn category(component_type: ComponentType) -> ComponentCategory {
    match component_type {
        ComponentType::Value
        | ComponentType::Trend
        | ComponentType::Progress
        | ComponentType::Gauge => ComponentCategory::Kpi,
        ComponentType::Table => ComponentCategory::Table,
        ComponentType::Text => ComponentCategory::Content,
        _ => ComponentCategory::Chart,
    }
}

/// Size a freshly added component starts with
pub fn default_size(component_type: ComponentType) -> GridSize {
    match category(component_type) {
        ComponentCategory::Kpi => GridSize::new(3, 2),
        ComponentCategory::Content => GridSize::new(4, 1),
        ComponentCategory::Table => GridSize::new(6, 4),
        ComponentCategory::Chart if component_type == ComponentType::Sparkline => GridSize::new(3, 2),
        ComponentCategory::Chart => GridSize::new(6, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_type() {
        let entries = catalog();
        assert_eq!(entries.len(), ComponentType::ALL.len());
        assert!(entries.iter().all(|e| !e.label.is_empty()));

        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["type"], "value");
        assert_eq!(json["category"], "kpi");
    }

    #[test]
    fn test_default_sizes() {
        assert_eq!(default_size(ComponentType::Value), GridSize::new(3, 2));
        assert_eq!(default_size(ComponentType::LineChart), GridSize::new(6, 4));
        assert_eq!(default_size(ComponentType::Sparkline), GridSize::new(3, 2));
    }
}
