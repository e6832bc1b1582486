// Card renderer - Component + resolved data -> declarative visual description
use crate::application::dimension_registry::DimensionRegistry;
use crate::application::metric_registry::MetricRegistry;
use crate::domain::catalog;
use crate::domain::chart::{ChartDataPoint, change_percent};
use crate::domain::component::{
    CanvasComponent, ChartProps, ComponentProps, DataBinding, GaugeProps, ProgressProps, TableProps,
    TextProps, TrendProps, ValueProps,
};
use crate::domain::metric::{MetricDefinition, ValueFormat};
use crate::domain::query::MetricsQuery;
use crate::domain::theme::ThemeContext;
use crate::domain::visual::{
    Series, SeriesChartKind, Slice, SliceChartKind, TrendDirection, VisualBody, VisualDescription,
};
use std::sync::Arc;

const UNCONFIGURED_MESSAGE: &str = "Selecione uma métrica para exibir dados";
const NO_DATA_MESSAGE: &str = "Sem dados para o período selecionado";
const NO_POSITIVE_MESSAGE: &str = "Sem valores positivos para exibir";

/// Resolution state handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum CardData {
    Loading,
    Failed(String),
    Points(Vec<ChartDataPoint>),
}

/// How a component's binding stands before any data is fetched
#[derive(Debug, Clone, PartialEq)]
pub enum BindingState<'a> {
    /// Draws from its own props only
    Unbound,
    Unconfigured,
    Disabled(String),
    Static(&'a [ChartDataPoint]),
    Query(&'a MetricsQuery),
}

impl BindingState<'_> {
    /// Whether the card needs points from a series source
    pub fn needs_resolution(&self) -> bool {
        matches!(self, BindingState::Query(_))
    }
}

#[derive(Debug, Clone)]
pub struct CardRenderer {
    theme: ThemeContext,
    metrics: Arc<MetricRegistry>,
    dimensions: Arc<DimensionRegistry>,
}

impl CardRenderer {
    pub fn new(theme: ThemeContext, metrics: Arc<MetricRegistry>, dimensions: Arc<DimensionRegistry>) -> Self {
        Self {
            theme,
            metrics,
            dimensions,
        }
    }

    pub fn theme(&self) -> &ThemeContext {
        &self.theme
    }

    pub fn binding_state<'a>(&self, component: &'a CanvasComponent) -> BindingState<'a> {
        if !component.component_type().is_data_bound() {
            return BindingState::Unbound;
        }
        match &component.data_source {
            None => BindingState::Unconfigured,
            Some(DataBinding::Static { data }) => BindingState::Static(data),
            Some(DataBinding::Metrics { metrics_query }) => {
                let Some(query) = metrics_query.as_ref() else {
                    return BindingState::Unconfigured;
                };
                let Some(metric_id) = query.metric_id() else {
                    return BindingState::Unconfigured;
                };
                if self.metrics.get(metric_id).is_none() {
                    return BindingState::Disabled(format!("Métrica '{}' indisponível", metric_id));
                }
                match query.dimension_id() {
                    Some(dimension_id) if self.dimensions.get(dimension_id).is_none() => {
                        BindingState::Disabled(format!("Dimensão '{}' indisponível", dimension_id))
                    }
                    _ => BindingState::Query(query),
                }
            }
        }
    }

    pub fn render(&self, component: &CanvasComponent, data: &CardData) -> VisualDescription {
        let metric = component.metric_id().and_then(|id| self.metrics.get(id));
        let title = component
            .props
            .title()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| metric.map(|m| m.name.clone()))
            .unwrap_or_else(|| catalog::label(component.component_type()).to_string());
        let accent = self.theme.accent(component.props.color());

        let body = match self.binding_state(component) {
            BindingState::Unconfigured => VisualBody::Unconfigured {
                message: UNCONFIGURED_MESSAGE.to_string(),
            },
            BindingState::Disabled(message) => VisualBody::Disabled { message },
            BindingState::Unbound | BindingState::Static(_) | BindingState::Query(_) => {
                let view = View {
                    theme: &self.theme,
                    metric,
                    dimension_name: self.dimension_name(component),
                    accent: &accent,
                };
                view.body(&component.props, data)
            }
        };

        VisualDescription {
            component_id: component.id.clone(),
            component_type: component.component_type(),
            position: component.position,
            size: component.size,
            title,
            accent,
            body,
        }
    }

    fn dimension_name(&self, component: &CanvasComponent) -> Option<String> {
        component
            .data_source
            .as_ref()
            .and_then(DataBinding::metrics_query)
            .and_then(MetricsQuery::dimension_id)
            .and_then(|id| self.dimensions.get(id))
            .map(|d| d.name.clone())
    }
}

/// Per-render context shared by the type branches
struct View<'a> {
    theme: &'a ThemeContext,
    metric: Option<&'a MetricDefinition>,
    dimension_name: Option<String>,
    accent: &'a str,
}

impl View<'_> {
    fn body(&self, props: &ComponentProps, data: &CardData) -> VisualBody {
        if let ComponentProps::Text(p) = props {
            return text(p);
        }
        let points = match data {
            CardData::Loading => return VisualBody::Loading,
            CardData::Failed(message) => {
                return VisualBody::Error {
                    message: message.clone(),
                };
            }
            CardData::Points(points) => points,
        };
        if points.is_empty() {
            return no_data(NO_DATA_MESSAGE);
        }

        match props {
            ComponentProps::Text(p) => text(p),
            ComponentProps::Value(p) => self.value(p, points),
            ComponentProps::Trend(p) => self.trend(p, points),
            ComponentProps::Table(p) => self.table(p, points),
            ComponentProps::Progress(p) => self.progress(p, points),
            ComponentProps::Gauge(p) => self.gauge(p, points),
            ComponentProps::Sparkline(p) => self.series(SeriesChartKind::Sparkline, p, points, false),
            ComponentProps::BarChart(p) => self.series(SeriesChartKind::Bar, p, points, true),
            ComponentProps::HorizontalBarChart(p) => self.series(SeriesChartKind::HorizontalBar, p, points, true),
            ComponentProps::StackedBarChart(p) => self.series(SeriesChartKind::StackedBar, p, points, true),
            ComponentProps::LineChart(p) => self.series(SeriesChartKind::Line, p, points, true),
            ComponentProps::AreaChart(p) => self.series(SeriesChartKind::Area, p, points, true),
            ComponentProps::ScatterChart(p) => self.series(SeriesChartKind::Scatter, p, points, true),
            ComponentProps::ComposedChart(p) => self.series(SeriesChartKind::Composed, p, points, true),
            ComponentProps::PieChart(p) => self.slices(SliceChartKind::Pie, p, points),
            ComponentProps::DonutChart(p) => self.slices(SliceChartKind::Donut, p, points),
            ComponentProps::RadialBarChart(p) => self.slices(SliceChartKind::RadialBar, p, points),
            ComponentProps::Treemap(p) => self.slices(SliceChartKind::Treemap, p, points),
            ComponentProps::FunnelChart(p) => self.slices(SliceChartKind::Funnel, p, points),
            ComponentProps::RadarChart(p) => self.radar(p, points),
        }
    }

    fn format(&self) -> ValueFormat {
        self.metric.map(|m| m.format).unwrap_or_default()
    }

    fn series_name(&self) -> String {
        self.metric
            .map(|m| m.name.clone())
            .unwrap_or_else(|| "Valor".to_string())
    }

    fn value(&self, props: &ValueProps, points: &[ChartDataPoint]) -> VisualBody {
        let (current, previous) = headline(points);
        let formatted = format!(
            "{}{}{}",
            props.prefix.as_deref().unwrap_or(""),
            self.theme.format_value(current, self.format(), props.decimals),
            props.suffix.as_deref().unwrap_or("")
        );
        VisualBody::Value {
            value: current,
            formatted,
            font_size: props.font_size,
            change_percent: previous.and_then(|p| change_percent(current, p)),
        }
    }

    fn trend(&self, props: &TrendProps, points: &[ChartDataPoint]) -> VisualBody {
        let (current, previous) = headline(points);
        let previous = previous.filter(|_| props.show_comparison);
        let change = previous.and_then(|p| change_percent(current, p));

        let direction = match change {
            Some(c) if c > 0.0 => TrendDirection::Up,
            Some(c) if c < 0.0 => TrendDirection::Down,
            _ => TrendDirection::Flat,
        };
        let good = match direction {
            TrendDirection::Up => Some(!props.invert_colors),
            TrendDirection::Down => Some(props.invert_colors),
            TrendDirection::Flat => None,
        };
        let color = match good {
            Some(true) => self.theme.positive.clone(),
            Some(false) => self.theme.negative.clone(),
            None => self.theme.muted.clone(),
        };

        VisualBody::Trend {
            current,
            formatted: self.theme.format_value(current, self.format(), None),
            previous,
            change_percent: change,
            direction,
            color,
        }
    }

    fn table(&self, props: &TableProps, points: &[ChartDataPoint]) -> VisualBody {
        let with_previous = points.iter().any(|p| p.previous_value.is_some());
        let limit = props.max_rows.unwrap_or(points.len());
        let format = self.format();

        let rows = points
            .iter()
            .take(limit)
            .map(|point| {
                let mut row = vec![
                    point.label.clone(),
                    self.theme.format_value(point.value, format, None),
                ];
                if with_previous {
                    row.push(
                        point
                            .previous_value
                            .map(|v| self.theme.format_value(v, format, None))
                            .unwrap_or_else(|| "-".to_string()),
                    );
                }
                row
            })
            .collect();

        let columns = if props.show_header {
            let mut columns = vec![
                self.dimension_name.clone().unwrap_or_else(|| "Item".to_string()),
                self.series_name(),
            ];
            if with_previous {
                columns.push("Período anterior".to_string());
            }
            columns
        } else {
            Vec::new()
        };

        VisualBody::Table {
            columns,
            rows,
            truncated: points.len() > limit,
        }
    }

    fn progress(&self, props: &ProgressProps, points: &[ChartDataPoint]) -> VisualBody {
        let (value, _) = headline(points);
        let target = props.target.unwrap_or(100.0);
        let percent = if target > 0.0 {
            (value / target * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        VisualBody::Progress {
            value,
            target,
            percent,
            formatted: self.theme.format_value(value, self.format(), None),
        }
    }

    fn gauge(&self, props: &GaugeProps, points: &[ChartDataPoint]) -> VisualBody {
        let (value, _) = headline(points);
        let span = props.max - props.min;
        let fraction = if span > 0.0 {
            ((value - props.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        VisualBody::Gauge {
            value,
            min: props.min,
            max: props.max,
            fraction,
            formatted: self.theme.format_value(value, self.format(), None),
        }
    }

    fn series(&self, chart: SeriesChartKind, props: &ChartProps, points: &[ChartDataPoint], decorated: bool) -> VisualBody {
        VisualBody::SeriesChart {
            chart,
            labels: points.iter().map(|p| p.label.clone()).collect(),
            series: self.value_series(props, points),
            show_legend: decorated && props.show_legend,
            show_grid: decorated && props.show_grid,
        }
    }

    fn radar(&self, props: &ChartProps, points: &[ChartDataPoint]) -> VisualBody {
        let series = self.value_series(props, points);
        let max = series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0_f64, f64::max);
        VisualBody::Radar {
            axes: points.iter().map(|p| p.label.clone()).collect(),
            series,
            max,
        }
    }

    /// Current values, plus the previous period when enabled and present
    fn value_series(&self, props: &ChartProps, points: &[ChartDataPoint]) -> Vec<Series> {
        let mut series = vec![Series {
            name: self.series_name(),
            color: self.accent.to_string(),
            values: points.iter().map(|p| p.value).collect(),
            comparison: false,
        }];
        if props.show_comparison && points.iter().any(|p| p.previous_value.is_some()) {
            series.push(Series {
                name: "Período anterior".to_string(),
                color: self.theme.muted.clone(),
                values: points.iter().map(|p| p.previous_value.unwrap_or(0.0)).collect(),
                comparison: true,
            });
        }
        series
    }

    fn slices(&self, chart: SliceChartKind, props: &ChartProps, points: &[ChartDataPoint]) -> VisualBody {
        let total: f64 = points.iter().map(|p| p.value.max(0.0)).sum();
        if total <= 0.0 {
            return no_data(NO_POSITIVE_MESSAGE);
        }
        // Funnel stages are shares of the first stage
        let base = match chart {
            SliceChartKind::Funnel => points[0].value.max(0.0),
            _ => total,
        };

        let slices = points
            .iter()
            .enumerate()
            .map(|(i, point)| Slice {
                label: point.label.clone(),
                value: point.value,
                fraction: if base > 0.0 {
                    (point.value.max(0.0) / base).min(1.0)
                } else {
                    0.0
                },
                color: self.theme.series_color(i),
            })
            .collect();

        VisualBody::SliceChart {
            chart,
            slices,
            total,
            show_legend: props.show_legend,
        }
    }
}

fn text(props: &TextProps) -> VisualBody {
    VisualBody::Text {
        text: props.text.clone(),
        font_size: props.font_size,
        align: props.align,
    }
}

fn no_data(message: &str) -> VisualBody {
    VisualBody::NoData {
        message: message.to_string(),
    }
}

/// The latest point and what it compares against: its previous period,
/// or the bucket before it when the series has no previous period.
/// Last point and its comparison. The preceding point only stands in for a time series.
fn headline(points: &[ChartDataPoint]) -> (f64, Option<f64>) {
    match points {
        [] => (0.0, None),
        [.., before, last] if last.timestamp.is_some() && before.timestamp.is_some() => {
            (last.value, last.previous_value.or(Some(before.value)))
        }
        [.., last] => (last.value, last.previous_value),
    }
}
