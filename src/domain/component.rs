// Canvas component domain model
use super::chart::ChartDataPoint;
use super::geometry::{GridPoint, GridRect, GridSize};
use super::query::MetricsQuery;
use serde::{Deserialize, Serialize};

/// Renderer dispatch key of a canvas component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    #[serde(rename = "value")]
    Value,
    #[serde(rename = "trend")]
    Trend,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "progress")]
    Progress,
    #[serde(rename = "gauge")]
    Gauge,
    #[serde(rename = "sparkline")]
    Sparkline,
    #[serde(rename = "recharts-bar")]
    BarChart,
    #[serde(rename = "recharts-horizontal-bar")]
    HorizontalBarChart,
    #[serde(rename = "recharts-stacked-bar")]
    StackedBarChart,
    #[serde(rename = "recharts-line")]
    LineChart,
    #[serde(rename = "recharts-area")]
    AreaChart,
    #[serde(rename = "recharts-pie")]
    PieChart,
    #[serde(rename = "recharts-donut")]
    DonutChart,
    #[serde(rename = "recharts-radar")]
    RadarChart,
    #[serde(rename = "recharts-radial-bar")]
    RadialBarChart,
    #[serde(rename = "recharts-scatter")]
    ScatterChart,
    #[serde(rename = "recharts-composed")]
    ComposedChart,
    #[serde(rename = "recharts-treemap")]
    Treemap,
    #[serde(rename = "recharts-funnel")]
    FunnelChart,
}

impl ComponentType {
    pub const ALL: [ComponentType; 20] = [
        ComponentType::Value,
        ComponentType::Trend,
        ComponentType::Table,
        ComponentType::Text,
        ComponentType::Progress,
        ComponentType::Gauge,
        ComponentType::Sparkline,
        ComponentType::BarChart,
        ComponentType::HorizontalBarChart,
        ComponentType::StackedBarChart,
        ComponentType::LineChart,
        ComponentType::AreaChart,
        ComponentType::PieChart,
        ComponentType::DonutChart,
        ComponentType::RadarChart,
        ComponentType::RadialBarChart,
        ComponentType::ScatterChart,
        ComponentType::ComposedChart,
        ComponentType::Treemap,
        ComponentType::FunnelChart,
    ];

    /// Tag used in persisted layouts and compatibility lists
    pub fn tag(&self) -> &'static str {
        match self {
            ComponentType::Value => "value",
            ComponentType::Trend => "trend",
            ComponentType::Table => "table",
            ComponentType::Text => "text",
            ComponentType::Progress => "progress",
            ComponentType::Gauge => "gauge",
            ComponentType::Sparkline => "sparkline",
            ComponentType::BarChart => "recharts-bar",
            ComponentType::HorizontalBarChart => "recharts-horizontal-bar",
            ComponentType::StackedBarChart => "recharts-stacked-bar",
            ComponentType::LineChart => "recharts-line",
            ComponentType::AreaChart => "recharts-area",
            ComponentType::PieChart => "recharts-pie",
            ComponentType::DonutChart => "recharts-donut",
            ComponentType::RadarChart => "recharts-radar",
            ComponentType::RadialBarChart => "recharts-radial-bar",
            ComponentType::ScatterChart => "recharts-scatter",
            ComponentType::ComposedChart => "recharts-composed",
            ComponentType::Treemap => "recharts-treemap",
            ComponentType::FunnelChart => "recharts-funnel",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Whether the component draws bound data (everything but free text)
    pub fn is_data_bound(&self) -> bool {
        !matches!(self, ComponentType::Text)
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrendProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub show_comparison: bool,
    /// A falling value is the good direction (costs, delays)
    pub invert_colors: bool,
}

impl Default for TrendProps {
    fn default() -> Self {
        Self {
            title: None,
            color: None,
            show_comparison: true,
            invert_colors: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
    pub show_header: bool,
}

impl Default for TableProps {
    fn default() -> Self {
        Self {
            title: None,
            max_rows: None,
            show_header: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Value that counts as 100%; defaults to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaugeProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub min: f64,
    pub max: f64,
}

impl Default for GaugeProps {
    fn default() -> Self {
        Self {
            title: None,
            color: None,
            min: 0.0,
            max: 100.0,
        }
    }
}

/// Props shared by the series and slice charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub show_legend: bool,
    pub show_grid: bool,
    /// Draw the previous-period series when points carry one
    pub show_comparison: bool,
}

impl Default for ChartProps {
    fn default() -> Self {
        Self {
            title: None,
            color: None,
            show_legend: true,
            show_grid: true,
            show_comparison: true,
        }
    }
}

/// Per-type display props. The variant is the component's type.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentProps {
    Value(ValueProps),
    Trend(TrendProps),
    Table(TableProps),
    Text(TextProps),
    Progress(ProgressProps),
    Gauge(GaugeProps),
    Sparkline(ChartProps),
    BarChart(ChartProps),
    HorizontalBarChart(ChartProps),
    StackedBarChart(ChartProps),
    LineChart(ChartProps),
    AreaChart(ChartProps),
    PieChart(ChartProps),
    DonutChart(ChartProps),
    RadarChart(ChartProps),
    RadialBarChart(ChartProps),
    ScatterChart(ChartProps),
    ComposedChart(ChartProps),
    Treemap(ChartProps),
    FunnelChart(ChartProps),
}

impl ComponentProps {
    /// Default props for a freshly added component
    pub fn default_for(component_type: ComponentType) -> Self {
        match component_type {
            ComponentType::Value => ComponentProps::Value(ValueProps::default()),
            ComponentType::Trend => ComponentProps::Trend(TrendProps::default()),
            ComponentType::Table => ComponentProps::Table(TableProps::default()),
            ComponentType::Text => ComponentProps::Text(TextProps {
                text: "Texto".to_string(),
                ..Default::default()
            }),
            ComponentType::Progress => ComponentProps::Progress(ProgressProps::default()),
            ComponentType::Gauge => ComponentProps::Gauge(GaugeProps::default()),
            other => Self::chart(other, ChartProps::default()).unwrap_or_else(|| {
                ComponentProps::BarChart(ChartProps::default())
            }),
        }
    }

    /// Wrap chart props for one of the chart types; `None` for non-chart types
    pub fn chart(component_type: ComponentType, props: ChartProps) -> Option<Self> {
        let props = match component_type {
            ComponentType::Sparkline => ComponentProps::Sparkline(props),
            ComponentType::BarChart => ComponentProps::BarChart(props),
            ComponentType::HorizontalBarChart => ComponentProps::HorizontalBarChart(props),
            ComponentType::StackedBarChart => ComponentProps::StackedBarChart(props),
            ComponentType::LineChart => ComponentProps::LineChart(props),
            ComponentType::AreaChart => ComponentProps::AreaChart(props),
            ComponentType::PieChart => ComponentProps::PieChart(props),
            ComponentType::DonutChart => ComponentProps::DonutChart(props),
            ComponentType::RadarChart => ComponentProps::RadarChart(props),
            ComponentType::RadialBarChart => ComponentProps::RadialBarChart(props),
            ComponentType::ScatterChart => ComponentProps::ScatterChart(props),
            ComponentType::ComposedChart => ComponentProps::ComposedChart(props),
            ComponentType::Treemap => ComponentProps::Treemap(props),
            ComponentType::FunnelChart => ComponentProps::FunnelChart(props),
            _ => return None,
        };
        Some(props)
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentProps::Value(_) => ComponentType::Value,
            ComponentProps::Trend(_) => ComponentType::Trend,
            ComponentProps::Table(_) => ComponentType::Table,
            ComponentProps::Text(_) => ComponentType::Text,
            ComponentProps::Progress(_) => ComponentType::Progress,
            ComponentProps::Gauge(_) => ComponentType::Gauge,
            ComponentProps::Sparkline(_) => ComponentType::Sparkline,
            ComponentProps::BarChart(_) => ComponentType::BarChart,
            ComponentProps::HorizontalBarChart(_) => ComponentType::HorizontalBarChart,
            ComponentProps::StackedBarChart(_) => ComponentType::StackedBarChart,
            ComponentProps::LineChart(_) => ComponentType::LineChart,
            ComponentProps::AreaChart(_) => ComponentType::AreaChart,
            ComponentProps::PieChart(_) => ComponentType::PieChart,
            ComponentProps::DonutChart(_) => ComponentType::DonutChart,
            ComponentProps::RadarChart(_) => ComponentType::RadarChart,
            ComponentProps::RadialBarChart(_) => ComponentType::RadialBarChart,
            ComponentProps::ScatterChart(_) => ComponentType::ScatterChart,
            ComponentProps::ComposedChart(_) => ComponentType::ComposedChart,
            ComponentProps::Treemap(_) => ComponentType::Treemap,
            ComponentProps::FunnelChart(_) => ComponentType::FunnelChart,
        }
    }

    /// Title override, if the user set one
    pub fn title(&self) -> Option<&str> {
        match self {
            ComponentProps::Value(p) => p.title.as_deref(),
            ComponentProps::Trend(p) => p.title.as_deref(),
            ComponentProps::Table(p) => p.title.as_deref(),
            ComponentProps::Text(_) => None,
            ComponentProps::Progress(p) => p.title.as_deref(),
            ComponentProps::Gauge(p) => p.title.as_deref(),
            ComponentProps::Sparkline(p)
            | ComponentProps::BarChart(p)
            | ComponentProps::HorizontalBarChart(p)
            | ComponentProps::StackedBarChart(p)
            | ComponentProps::LineChart(p)
            | ComponentProps::AreaChart(p)
            | ComponentProps::PieChart(p)
            | ComponentProps::DonutChart(p)
            | ComponentProps::RadarChart(p)
            | ComponentProps::RadialBarChart(p)
            | ComponentProps::ScatterChart(p)
            | ComponentProps::ComposedChart(p)
            | ComponentProps::Treemap(p)
            | ComponentProps::FunnelChart(p) => p.title.as_deref(),
        }
    }

    /// Color token override, if the user set one
    pub fn color(&self) -> Option<&str> {
        match self {
            ComponentProps::Value(p) => p.color.as_deref(),
            ComponentProps::Trend(p) => p.color.as_deref(),
            ComponentProps::Table(_) => None,
            ComponentProps::Text(p) => p.color.as_deref(),
            ComponentProps::Progress(p) => p.color.as_deref(),
            ComponentProps::Gauge(p) => p.color.as_deref(),
            ComponentProps::Sparkline(p)
            | ComponentProps::BarChart(p)
            | ComponentProps::HorizontalBarChart(p)
            | ComponentProps::StackedBarChart(p)
            | ComponentProps::LineChart(p)
            | ComponentProps::AreaChart(p)
            | ComponentProps::PieChart(p)
            | ComponentProps::DonutChart(p)
            | ComponentProps::RadarChart(p)
            | ComponentProps::RadialBarChart(p)
            | ComponentProps::ScatterChart(p)
            | ComponentProps::ComposedChart(p)
            | ComponentProps::Treemap(p)
            | ComponentProps::FunnelChart(p) => p.color.as_deref(),
        }
    }

    fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            ComponentProps::Value(p) => serde_json::to_value(p),
            ComponentProps::Trend(p) => serde_json::to_value(p),
            ComponentProps::Table(p) => serde_json::to_value(p),
            ComponentProps::Text(p) => serde_json::to_value(p),
            ComponentProps::Progress(p) => serde_json::to_value(p),
            ComponentProps::Gauge(p) => serde_json::to_value(p),
            ComponentProps::Sparkline(p)
            | ComponentProps::BarChart(p)
            | ComponentProps::HorizontalBarChart(p)
            | ComponentProps::StackedBarChart(p)
            | ComponentProps::LineChart(p)
            | ComponentProps::AreaChart(p)
            | ComponentProps::PieChart(p)
            | ComponentProps::DonutChart(p)
            | ComponentProps::RadarChart(p)
            | ComponentProps::RadialBarChart(p)
            | ComponentProps::ScatterChart(p)
            | ComponentProps::ComposedChart(p)
            | ComponentProps::Treemap(p)
            | ComponentProps::FunnelChart(p) => serde_json::to_value(p),
        }
    }

    fn from_value(
        component_type: ComponentType,
        value: serde_json::Value,
    ) -> serde_json::Result<Self> {
        // Older layouts may store `null` where props were never edited
        let value = if value.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            value
        };
        let props = match component_type {
            ComponentType::Value => ComponentProps::Value(serde_json::from_value(value)?),
            ComponentType::Trend => ComponentProps::Trend(serde_json::from_value(value)?),
            ComponentType::Table => ComponentProps::Table(serde_json::from_value(value)?),
            ComponentType::Text => ComponentProps::Text(serde_json::from_value(value)?),
            ComponentType::Progress => ComponentProps::Progress(serde_json::from_value(value)?),
            ComponentType::Gauge => ComponentProps::Gauge(serde_json::from_value(value)?),
            chart => {
                let props: ChartProps = serde_json::from_value(value)?;
                match Self::chart(chart, props) {
                    Some(props) => props,
                    None => {
                        return Err(serde::de::Error::custom(format!(
                            "no props shape for component type {}",
                            chart
                        )));
                    }
                }
            }
        };
        Ok(props)
    }
}

/// Where a component's data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataBinding {
    Metrics {
        #[serde(
            rename = "metricsQuery",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        metrics_query: Option<MetricsQuery>,
    },
    Static {
        #[serde(default)]
        data: Vec<ChartDataPoint>,
    },
}

impl DataBinding {
    pub fn metrics(query: MetricsQuery) -> Self {
        DataBinding::Metrics {
            metrics_query: Some(query),
        }
    }

    pub fn fixed(data: Vec<ChartDataPoint>) -> Self {
        DataBinding::Static { data }
    }

    pub fn metrics_query(&self) -> Option<&MetricsQuery> {
        match self {
            DataBinding::Metrics { metrics_query } => metrics_query.as_ref(),
            DataBinding::Static { .. } => None,
        }
    }
}

/// A placed card on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawComponent", try_from = "RawComponent")]
pub struct CanvasComponent {
    pub id: String,
    pub position: GridPoint,
    pub size: GridSize,
    pub props: ComponentProps,
    pub data_source: Option<DataBinding>,
}

impl CanvasComponent {
    pub fn new(id: &str, component_type: ComponentType, position: GridPoint, size: GridSize) -> Self {
        Self {
            id: id.to_string(),
            position,
            size,
            props: ComponentProps::default_for(component_type),
            data_source: None,
        }
    }

    pub fn with_props(mut self, props: ComponentProps) -> Self {
        self.props = props;
        self
    }

    pub fn with_binding(mut self, binding: DataBinding) -> Self {
        self.data_source = Some(binding);
        self
    }

    pub fn component_type(&self) -> ComponentType {
        self.props.component_type()
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.position, self.size)
    }

    /// The bound metric id, if the component is bound to a metrics query
    pub fn metric_id(&self) -> Option<&str> {
        self.data_source
            .as_ref()
            .and_then(DataBinding::metrics_query)
            .and_then(MetricsQuery::metric_id)
    }
}

/// Persisted shape: `{id, type, x, y, width, height, props, dataSource}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComponent {
    id: String,
    #[serde(rename = "type")]
    component_type: ComponentType,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    #[serde(default)]
    props: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_source: Option<DataBinding>,
}

impl From<CanvasComponent> for RawComponent {
    fn from(component: CanvasComponent) -> Self {
        let component_type = component.component_type();
        // Props are plain structs of strings, numbers and bools
        let props = component
            .props
            .to_value()
            .unwrap_or(serde_json::Value::Null);
        Self {
            id: component.id,
            component_type,
            x: component.position.x,
            y: component.position.y,
            width: component.size.width,
            height: component.size.height,
            props,
            data_source: component.data_source,
        }
    }
}

impl TryFrom<RawComponent> for CanvasComponent {
    type Error = serde_json::Error;

    fn try_from(raw: RawComponent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            position: GridPoint::new(raw.x, raw.y),
            size: GridSize::new(raw.width, raw.height),
            props: ComponentProps::from_value(raw.component_type, raw.props)?,
            data_source: raw.data_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tags_round_trip() {
        for component_type in ComponentType::ALL {
            assert_eq!(ComponentType::from_tag(component_type.tag()), Some(component_type));
            assert_eq!(
                ComponentProps::default_for(component_type).component_type(),
                component_type
            );
        }
        assert_eq!(ComponentType::from_tag("recharts-sankey"), None);
    }

    #[test]
    fn test_persisted_shape() {
        let component = CanvasComponent::new(
            "value-1",
            ComponentType::Value,
            GridPoint::new(2, 3),
            GridSize::new(3, 2),
        )
        .with_binding(DataBinding::metrics(MetricsQuery::for_metric("receita_total")));

        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["type"], "value");
        assert_eq!(json["x"], 2);
        assert_eq!(json["height"], 2);
        assert_eq!(json["dataSource"]["type"], "metrics");
        assert_eq!(json["dataSource"]["metricsQuery"]["metric"], "receita_total");
    }

    #[test]
    fn test_props_follow_type_tag() {
        let json = json!({
            "id": "pie-1",
            "type": "recharts-pie",
            "x": 0, "y": 0, "width": 4, "height": 4,
            "props": { "title": "Por categoria", "showLegend": false }
        });
        let component: CanvasComponent = serde_json::from_value(json).unwrap();
        assert_eq!(component.component_type(), ComponentType::PieChart);
        assert_eq!(component.props.title(), Some("Por categoria"));
        match &component.props {
            ComponentProps::PieChart(props) => {
                assert!(!props.show_legend);
                assert!(props.show_grid);
            }
            other => panic!("unexpected props {:?}", other),
        }
        assert!(component.data_source.is_none());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = json!({
            "id": "x", "type": "sankey", "x": 0, "y": 0, "width": 1, "height": 1
        });
        assert!(serde_json::from_value::<CanvasComponent>(json).is_err());
    }

    #[test]
    fn test_metric_id_requires_metrics_binding() {
        let base = CanvasComponent::new("t", ComponentType::Trend, GridPoint::ORIGIN, GridSize::new(3, 2));
        assert_eq!(base.metric_id(), None);

        let unbound = base.clone().with_binding(DataBinding::Metrics { metrics_query: None });
        assert_eq!(unbound.metric_id(), None);

        let fixed = base.clone().with_binding(DataBinding::fixed(vec![ChartDataPoint::new("a", 1.0)]));
        assert_eq!(fixed.metric_id(), None);

        let bound = base.with_binding(DataBinding::metrics(MetricsQuery::for_metric("ticket_medio")));
        assert_eq!(bound.metric_id(), Some("ticket_medio"));
    }
}
