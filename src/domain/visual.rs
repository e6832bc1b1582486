// Declarative draw descriptions produced by the card renderer
use super::component::{ComponentType, TextAlign};
use super::geometry::{GridPoint, GridSize};
use serde::Serialize;

/// Everything a UI layer needs to draw one card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualDescription {
    pub component_id: String,
    pub component_type: ComponentType,
    pub position: GridPoint,
    pub size: GridSize,
    pub title: String,
    pub accent: String,
    pub body: VisualBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesChartKind {
    Sparkline,
    Bar,
    HorizontalBar,
    StackedBar,
    Line,
    Area,
    Scatter,
    Composed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceChartKind {
    Pie,
    Donut,
    RadialBar,
    Treemap,
    Funnel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
    /// Drawn dashed/dimmed as the previous-period comparison
    pub comparison: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    pub label: String,
    pub value: f64,
    /// Share of the total, `0.0..=1.0`; for funnels, share of the first stage
    pub fraction: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualBody {
    Loading,
    Error {
        message: String,
    },
    /// No metric bound yet
    Unconfigured {
        message: String,
    },
    /// Bound to a metric or dimension the registries do not know
    Disabled {
        message: String,
    },
    NoData {
        message: String,
    },
    Value {
        value: f64,
        formatted: String,
        font_size: Option<u32>,
        change_percent: Option<f64>,
    },
    Trend {
        current: f64,
        formatted: String,
        previous: Option<f64>,
        change_percent: Option<f64>,
        direction: TrendDirection,
        color: String,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        truncated: bool,
    },
    Text {
        text: String,
        font_size: Option<u32>,
        align: TextAlign,
    },
    Progress {
        value: f64,
        target: f64,
        percent: f64,
        formatted: String,
    },
    Gauge {
        value: f64,
        min: f64,
        max: f64,
        /// Needle position, `0.0..=1.0`
        fraction: f64,
        formatted: String,
    },
    SeriesChart {
        chart: SeriesChartKind,
        labels: Vec<String>,
        series: Vec<Series>,
        show_legend: bool,
        show_grid: bool,
    },
    SliceChart {
        chart: SliceChartKind,
        slices: Vec<Slice>,
        total: f64,
        show_legend: bool,
    },
    Radar {
        axes: Vec<String>,
        series: Vec<Series>,
        max: f64,
    },
}

impl VisualBody {
    /// Placeholder states that carry no drawn data
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            VisualBody::Loading
                | VisualBody::Error { .. }
                | VisualBody::Unconfigured { .. }
                | VisualBody::Disabled { .. }
                | VisualBody::NoData { .. }
        )
    }
}
