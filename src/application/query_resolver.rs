// Query resolver - MetricsQuery + tabular rows -> ordered chart points
use crate::application::dimension_registry::{DEFAULT_DATE_FIELD, DimensionRegistry};
use crate::application::metric_registry::MetricRegistry;
use crate::application::temporal::{
    TimeWindow, bucket_label, parse_timestamp, resolve_window, to_timestamp_string, truncate,
};
use crate::domain::chart::{ChartDataPoint, TabularRow};
use crate::domain::dimension::{DimensionDefinition, DimensionKind, Granularity};
use crate::domain::metric::{AggregationKind, MetricDefinition};
use crate::domain::query::{FilterCondition, FilterGroup, FilterLogic, FilterOperator, MetricsQuery};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Label used for rows whose categorical field is missing or blank
pub const EMPTY_CATEGORY_LABEL: &str = "(vazio)";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("no metric selected")]
    MissingMetric,
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),
    #[error("invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),
}

impl ResolveError {
    /// Unknown references are configuration problems, not resolution failures
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ResolveError::MissingMetric | ResolveError::UnknownMetric(_) | ResolveError::UnknownDimension(_)
        )
    }

    fn filter(condition: &FilterCondition, reason: impl Into<String>) -> Self {
        ResolveError::InvalidFilter {
            field: condition.field.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryResolver {
    metrics: Arc<MetricRegistry>,
    dimensions: Arc<DimensionRegistry>,
    date_field: String,
    now: Option<DateTime<Utc>>,
}

impl QueryResolver {
    pub fn new(metrics: Arc<MetricRegistry>, dimensions: Arc<DimensionRegistry>) -> Self {
        Self {
            metrics,
            dimensions,
            date_field: DEFAULT_DATE_FIELD.to_string(),
            now: None,
        }
    }

    pub fn builtin() -> Self {
        Self::new(MetricRegistry::builtin(), DimensionRegistry::builtin())
    }

    /// Field date ranges filter on
    pub fn with_date_field(mut self, field: &str) -> Self {
        self.date_field = field.to_string();
        self
    }

    /// Pin the instant presets resolve against
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn metrics(&self) -> &Arc<MetricRegistry> {
        &self.metrics
    }

    pub fn dimensions(&self) -> &Arc<DimensionRegistry> {
        &self.dimensions
    }

    pub fn resolve(&self, query: &MetricsQuery, rows: &[TabularRow]) -> Result<Vec<ChartDataPoint>, ResolveError> {
        let metric_id = query.metric_id().ok_or(ResolveError::MissingMetric)?;
        let metric = self
            .metrics
            .get(metric_id)
            .ok_or_else(|| ResolveError::UnknownMetric(metric_id.to_string()))?;
        let dimension = match query.dimension_id() {
            Some(id) => Some(
                self.dimensions
                    .get(id)
                    .ok_or_else(|| ResolveError::UnknownDimension(id.to_string()))?,
            ),
            None => None,
        };
        let aggregation = query.aggregation.unwrap_or(metric.aggregation);

        let filters = match &query.filters {
            Some(group) => Some(CompiledFilters::compile(group)?),
            None => None,
        };
        let window = match &query.date_range {
            Some(range) => Some(
                resolve_window(range, self.now.unwrap_or_else(Utc::now))
                    .map_err(|e| ResolveError::InvalidDateRange(e.to_string()))?,
            ),
            None => None,
        };

        let filtered: Vec<&TabularRow> = rows
            .iter()
            .filter(|row| filters.as_ref().is_none_or(|f| f.matches(row)))
            .collect();

        let current: Vec<&TabularRow> = match &window {
            Some(window) => self.rows_within(&filtered, window),
            None => filtered.clone(),
        };

        let mut points = self.aggregate(metric, dimension, aggregation, &current);

        if let Some(previous_window) = window.as_ref().and_then(TimeWindow::previous) {
            let previous_rows = self.rows_within(&filtered, &previous_window);
            if !previous_rows.is_empty() && !points.is_empty() {
                let previous = self.aggregate(metric, dimension, aggregation, &previous_rows);
                attach_previous(&mut points, &previous, dimension);
            }
        }

        tracing::debug!(
            "Resolved metric {} ({}) over {} of {} rows into {} points",
            metric.id,
            aggregation.as_str(),
            current.len(),
            rows.len(),
            points.len()
        );

        Ok(points)
    }

    fn rows_within<'r>(&self, rows: &[&'r TabularRow], window: &TimeWindow) -> Vec<&'r TabularRow> {
        rows.iter()
            .copied()
            .filter(|row| {
                row.get(&self.date_field)
                    .and_then(parse_timestamp)
                    .is_some_and(|ts| window.contains(ts))
            })
            .collect()
    }

    fn aggregate(
        &self,
        metric: &MetricDefinition,
        dimension: Option<&DimensionDefinition>,
        aggregation: AggregationKind,
        rows: &[&TabularRow],
    ) -> Vec<ChartDataPoint> {
        if rows.is_empty() {
            return Vec::new();
        }

        let reduce = |bucket: &[&TabularRow]| -> f64 {
            let values: Vec<Option<f64>> = bucket
                .iter()
                .map(|row| row.get(&metric.value_field).and_then(numeric))
                .collect();
            aggregation.reduce(&values)
        };

        let Some(dimension) = dimension else {
            return vec![ChartDataPoint::new(metric.name.clone(), reduce(rows))];
        };

        match &dimension.kind {
            DimensionKind::Temporal { granularity } => {
                temporal_buckets(rows, &dimension.field, *granularity)
                    .into_iter()
                    .map(|(start, bucket)| {
                        ChartDataPoint::new(bucket_label(start, *granularity), reduce(&bucket))
                            .with_timestamp(to_timestamp_string(start))
                    })
                    .collect()
            }
            DimensionKind::Categorical { .. } => categorical_buckets(rows, &dimension.field)
                .into_iter()
                .map(|(label, bucket)| ChartDataPoint::new(label.clone(), reduce(&bucket)).with_category(label))
                .collect(),
            DimensionKind::Numeric { bucket_width } => numeric_buckets(rows, &dimension.field, *bucket_width)
                .into_iter()
                .map(|(label, bucket)| ChartDataPoint::new(label, reduce(&bucket)))
                .collect(),
        }
    }
}

/// Temporal buckets pair by position, the rest by label
fn attach_previous(points: &mut [ChartDataPoint], previous: &[ChartDataPoint], dimension: Option<&DimensionDefinition>) {
    match dimension {
        None => {
            if let (Some(point), Some(prior)) = (points.first_mut(), previous.first()) {
                point.previous_value = Some(prior.value);
            }
        }
        Some(d) if d.is_temporal() => {
            for (point, prior) in points.iter_mut().zip(previous) {
                point.previous_value = Some(prior.value);
            }
        }
        Some(_) => {
            let by_label: HashMap<&str, f64> = previous.iter().map(|p| (p.label.as_str(), p.value)).collect();
            for point in points.iter_mut() {
                if let Some(value) = by_label.get(point.label.as_str()) {
                    point.previous_value = Some(*value);
                }
            }
        }
    }
}

fn temporal_buckets<'r>(
    rows: &[&'r TabularRow],
    field: &str,
    granularity: Granularity,
) -> BTreeMap<DateTime<Utc>, Vec<&'r TabularRow>> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<&'r TabularRow>> = BTreeMap::new();
    let mut skipped = 0usize;
    for row in rows {
        match row.get(field).and_then(parse_timestamp).and_then(|ts| truncate(ts, granularity)) {
            Some(start) => buckets.entry(start).or_default().push(*row),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!("Skipped {} rows without a usable '{}' timestamp", skipped, field);
    }
    buckets
}

fn categorical_buckets<'r>(rows: &[&'r TabularRow], field: &str) -> Vec<(String, Vec<&'r TabularRow>)> {
    let mut order: Vec<(String, Vec<&'r TabularRow>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let label = row
            .get(field)
            .and_then(text)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| EMPTY_CATEGORY_LABEL.to_string());
        match index.get(&label) {
            Some(&i) => order[i].1.push(*row),
            None => {
                index.insert(label.clone(), order.len());
                order.push((label, vec![*row]));
            }
        }
    }
    order
}

fn numeric_buckets<'r>(rows: &[&'r TabularRow], field: &str, width: f64) -> Vec<(String, Vec<&'r TabularRow>)> {
    let width = if width > 0.0 { width } else { 1.0 };
    let mut buckets: BTreeMap<i64, Vec<&'r TabularRow>> = BTreeMap::new();
    for row in rows {
        if let Some(value) = row.get(field).and_then(numeric) {
            buckets.entry((value / width).floor() as i64).or_default().push(*row);
        }
    }
    buckets
        .into_iter()
        .map(|(bin, bucket)| {
            let low = bin as f64 * width;
            (format!("{}-{}", format_bound(low), format_bound(low + width)), bucket)
        })
        .collect()
}

fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Numbers and numeric strings; anything else is not a value
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn loosely_equal(cell: &Value, expected: &Value) -> bool {
    if let (Some(a), Some(b)) = (numeric(cell), numeric(expected)) {
        return a == b;
    }
    match (text(cell), text(expected)) {
        (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        _ => cell.is_null() && expected.is_null(),
    }
}

/// Right-hand side of an ordering comparison
#[derive(Debug, Clone, Copy)]
enum Bound {
    Number(f64),
    Instant(DateTime<Utc>),
}

impl Bound {
    fn parse(value: &Value) -> Option<Self> {
        numeric(value)
            .map(Bound::Number)
            .or_else(|| parse_timestamp(value).map(Bound::Instant))
    }

    /// Orders `cell` against the bound; `None` when the cell is not comparable
    fn compare(&self, cell: &Value) -> Option<std::cmp::Ordering> {
        match self {
            Bound::Number(bound) => numeric(cell).and_then(|v| v.partial_cmp(bound)),
            Bound::Instant(bound) => parse_timestamp(cell).map(|ts| ts.cmp(bound)),
        }
    }
}

#[derive(Debug, Clone)]
enum Predicate {
    Equals(Value),
    NotEquals(Value),
    Contains(String),
    NotContains(String),
    Compare(FilterOperator, Bound),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Between(Bound, Bound),
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone)]
struct CompiledCondition {
    field: String,
    predicate: Predicate,
}

impl CompiledCondition {
    fn compile(condition: &FilterCondition) -> Result<Self, ResolveError> {
        if condition.field.trim().is_empty() {
            return Err(ResolveError::filter(condition, "missing field name"));
        }

        let predicate = match condition.operator {
            FilterOperator::Equals => Predicate::Equals(scalar(condition)?),
            FilterOperator::NotEquals => Predicate::NotEquals(scalar(condition)?),
            FilterOperator::Contains | FilterOperator::NotContains => {
                let needle = text(&condition.value)
                    .ok_or_else(|| ResolveError::filter(condition, "expected text to search for"))?
                    .to_lowercase();
                if condition.operator == FilterOperator::Contains {
                    Predicate::Contains(needle)
                } else {
                    Predicate::NotContains(needle)
                }
            }
            op @ (FilterOperator::GreaterThan
            | FilterOperator::GreaterOrEqual
            | FilterOperator::LessThan
            | FilterOperator::LessOrEqual) => {
                let bound = Bound::parse(&condition.value)
                    .ok_or_else(|| ResolveError::filter(condition, "expected a number or date"))?;
                Predicate::Compare(op, bound)
            }
            FilterOperator::In | FilterOperator::NotIn => {
                let Value::Array(items) = &condition.value else {
                    return Err(ResolveError::filter(condition, "expected a list of values"));
                };
                if condition.operator == FilterOperator::In {
                    Predicate::In(items.clone())
                } else {
                    Predicate::NotIn(items.clone())
                }
            }
            FilterOperator::Between => match &condition.value {
                Value::Array(items) if items.len() == 2 => {
                    match (Bound::parse(&items[0]), Bound::parse(&items[1])) {
                        (Some(low @ Bound::Number(_)), Some(high @ Bound::Number(_)))
                        | (Some(low @ Bound::Instant(_)), Some(high @ Bound::Instant(_))) => {
                            Predicate::Between(low, high)
                        }
                        _ => return Err(ResolveError::filter(condition, "bounds must both be numbers or both dates")),
                    }
                }
                _ => return Err(ResolveError::filter(condition, "expected [low, high]")),
            },
            FilterOperator::IsEmpty => Predicate::IsEmpty,
            FilterOperator::IsNotEmpty => Predicate::IsNotEmpty,
        };

        Ok(Self {
            field: condition.field.clone(),
            predicate,
        })
    }

    fn matches(&self, row: &TabularRow) -> bool {
        let cell = row.get(&self.field);
        match &self.predicate {
            Predicate::IsEmpty => is_empty(cell),
            Predicate::IsNotEmpty => !is_empty(cell),
            Predicate::Equals(expected) => cell.is_some_and(|c| equals_cell(c, expected)),
            Predicate::NotEquals(expected) => !cell.is_some_and(|c| equals_cell(c, expected)),
            Predicate::Contains(needle) => cell.is_some_and(|c| contains_cell(c, needle)),
            Predicate::NotContains(needle) => !cell.is_some_and(|c| contains_cell(c, needle)),
            Predicate::In(options) => cell.is_some_and(|c| options.iter().any(|o| equals_cell(c, o))),
            Predicate::NotIn(options) => !cell.is_some_and(|c| options.iter().any(|o| equals_cell(c, o))),
            Predicate::Compare(op, bound) => {
                let Some(ordering) = cell.and_then(|c| bound.compare(c)) else {
                    return false;
                };
                match op {
                    FilterOperator::GreaterThan => ordering.is_gt(),
                    FilterOperator::GreaterOrEqual => ordering.is_ge(),
                    FilterOperator::LessThan => ordering.is_lt(),
                    FilterOperator::LessOrEqual => ordering.is_le(),
                    _ => false,
                }
            }
            Predicate::Between(low, high) => cell.is_some_and(|c| {
                low.compare(c).is_some_and(|o| o.is_ge()) && high.compare(c).is_some_and(|o| o.is_le())
            }),
        }
    }
}

fn scalar(condition: &FilterCondition) -> Result<Value, ResolveError> {
    match &condition.value {
        Value::Array(_) | Value::Object(_) => Err(ResolveError::filter(condition, "expected a single value")),
        value => Ok(value.clone()),
    }
}

/// Equality against a cell; list cells match when any element does
fn equals_cell(cell: &Value, expected: &Value) -> bool {
    match cell {
        Value::Array(items) => items.iter().any(|item| loosely_equal(item, expected)),
        _ => loosely_equal(cell, expected),
    }
}

fn contains_cell(cell: &Value, needle: &str) -> bool {
    match cell {
        Value::Array(items) => items.iter().any(|item| contains_cell(item, needle)),
        _ => text(cell).is_some_and(|t| t.to_lowercase().contains(needle)),
    }
}

#[derive(Debug, Clone)]
struct CompiledFilters {
    logic: FilterLogic,
    conditions: Vec<CompiledCondition>,
}

impl CompiledFilters {
    fn compile(group: &FilterGroup) -> Result<Self, ResolveError> {
        let conditions = group
            .conditions
            .iter()
            .map(CompiledCondition::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            logic: group.logic,
            conditions,
        })
    }

    fn matches(&self, row: &TabularRow) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        match self.logic {
            FilterLogic::And => self.conditions.iter().all(|c| c.matches(row)),
            FilterLogic::Or => self.conditions.iter().any(|c| c.matches(row)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{DatePreset, DateRange};
    use chrono::TimeZone;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<TabularRow> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("row must be an object, got {}", other),
            })
            .collect()
    }

    fn resolver() -> QueryResolver {
        QueryResolver::builtin().at(Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_sum_without_dimension() {
        let data = rows(vec![json!({"amount": 10}), json!({"amount": 20}), json!({"amount": 30})]);
        let points = resolver().resolve(&MetricsQuery::for_metric("receita_total"), &data).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "Receita total");
        assert_eq!(points[0].value, 60.0);
        assert_eq!(points[0].previous_value, None);
    }

    #[test]
    fn test_aggregation_override() {
        let data = rows(vec![json!({"amount": 10}), json!({"amount": 20}), json!({"amount": 30})]);
        let query = MetricsQuery::for_metric("receita_total").with_aggregation(AggregationKind::Avg);
        let points = resolver().resolve(&query, &data).unwrap();
        assert_eq!(points[0].value, 20.0);
    }

    #[test]
    fn test_non_numeric_values() {
        let data = rows(vec![
            json!({"amount": "15.5"}),
            json!({"amount": "n/a"}),
            json!({}),
            json!({"amount": 4.5}),
        ]);
        let resolver = resolver();
        let sum = resolver.resolve(&MetricsQuery::for_metric("receita_total"), &data).unwrap();
        assert_eq!(sum[0].value, 20.0);

        let avg = resolver.resolve(&MetricsQuery::for_metric("ticket_medio"), &data).unwrap();
        assert_eq!(avg[0].value, 10.0);

        let count = resolver
            .resolve(&MetricsQuery::for_metric("receita_total").with_aggregation(AggregationKind::Count), &data)
            .unwrap();
        assert_eq!(count[0].value, 4.0);
    }

    #[test]
    fn test_empty_after_filter() {
        let data = rows(vec![json!({"amount": 10, "status": "pago"})]);
        let query = MetricsQuery::for_metric("receita_total").with_filters(FilterGroup::all(vec![
            FilterCondition::new("status", FilterOperator::Equals, json!("atrasado")),
        ]));
        assert!(resolver().resolve(&query, &data).unwrap().is_empty());
        assert!(resolver().resolve(&MetricsQuery::for_metric("receita_total"), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_temporal_order_is_chronological() {
        let data = rows(vec![
            json!({"date": "2024-03-03", "amount": 3}),
            json!({"date": "2024-03-01T10:00:00Z", "amount": 1}),
            json!({"date": "2024-03-02", "amount": 2}),
            json!({"date": "2024-03-01T18:30:00Z", "amount": 1}),
        ]);
        let query = MetricsQuery::for_metric("receita_total").with_dimension("por_dia");
        let points = resolver().resolve(&query, &data).unwrap();
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["01/03/2024", "02/03/2024", "03/03/2024"]);
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, [2.0, 2.0, 3.0]);
        assert_eq!(points[0].timestamp.as_deref(), Some("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn test_categorical_first_seen_order() {
        let data = rows(vec![
            json!({"status": "pendente", "amount": 5}),
            json!({"status": "pago", "amount": 10}),
            json!({"status": "pendente", "amount": 7}),
            json!({"amount": 1}),
        ]);
        let query = MetricsQuery::for_metric("receita_total").with_dimension("status");
        let points = resolver().resolve(&query, &data).unwrap();
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["pendente", "pago", EMPTY_CATEGORY_LABEL]);
        assert_eq!(points[0].value, 12.0);
        assert_eq!(points[0].category.as_deref(), Some("pendente"));
    }

    #[test]
    fn test_numeric_buckets() {
        let data = rows(vec![json!({"amount": 750}), json!({"amount": 120}), json!({"amount": 980})]);
        let query = MetricsQuery::for_metric("ocorrencias").with_dimension("faixa_valor");
        let points = resolver().resolve(&query, &data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "0-500");
        assert_eq!(points[0].value, 1.0);
        assert_eq!(points[1].label, "500-1000");
        assert_eq!(points[1].value, 2.0);
    }

    #[test]
    fn test_filter_logic() {
        let data = rows(vec![
            json!({"status": "pago", "category": "reserva", "amount": 1}),
            json!({"status": "pago", "category": "multa", "amount": 10}),
            json!({"status": "pendente", "category": "reserva", "amount": 100}),
            json!({"status": "pendente", "category": "multa", "amount": 1000}),
        ]);
        let conditions = vec![
            FilterCondition::new("status", FilterOperator::Equals, json!("pago")),
            FilterCondition::new("category", FilterOperator::Equals, json!("reserva")),
        ];
        let resolver = resolver();

        let and = MetricsQuery::for_metric("receita_total").with_filters(FilterGroup::all(conditions.clone()));
        assert_eq!(resolver.resolve(&and, &data).unwrap()[0].value, 1.0);

        let or = MetricsQuery::for_metric("receita_total").with_filters(FilterGroup::any(conditions));
        assert_eq!(resolver.resolve(&or, &data).unwrap()[0].value, 111.0);
    }

    #[test]
    fn test_filter_operators() {
        let data = rows(vec![
            json!({"id": 1, "amount": 50, "owner": "Ana Souza", "date": "2024-01-10"}),
            json!({"id": 2, "amount": 150, "owner": "Bruno", "date": "2024-02-10"}),
            json!({"id": 3, "amount": 250, "owner": "", "date": "2024-03-10"}),
        ]);
        let resolver = resolver();
        let count = |condition: FilterCondition| -> f64 {
            let query = MetricsQuery::for_metric("ocorrencias").with_filters(FilterGroup::all(vec![condition]));
            resolver.resolve(&query, &data).unwrap().first().map(|p| p.value).unwrap_or(0.0)
        };

        assert_eq!(count(FilterCondition::new("amount", FilterOperator::GreaterThan, json!(100))), 2.0);
        assert_eq!(count(FilterCondition::new("amount", FilterOperator::LessOrEqual, json!("150"))), 2.0);
        assert_eq!(count(FilterCondition::new("amount", FilterOperator::Between, json!([100, 200]))), 1.0);
        assert_eq!(count(FilterCondition::new("owner", FilterOperator::Contains, json!("souza"))), 1.0);
        assert_eq!(count(FilterCondition::new("owner", FilterOperator::IsEmpty, Value::Null)), 1.0);
        assert_eq!(count(FilterCondition::new("owner", FilterOperator::NotEquals, json!("bruno"))), 2.0);
        assert_eq!(count(FilterCondition::new("id", FilterOperator::In, json!([1, 3, 9]))), 2.0);
        assert_eq!(count(FilterCondition::new("id", FilterOperator::NotIn, json!([1]))), 2.0);
        assert_eq!(count(FilterCondition::new("date", FilterOperator::GreaterOrEqual, json!("2024-02-10"))), 2.0);
        assert_eq!(count(FilterCondition::new("missing", FilterOperator::NotContains, json!("x"))), 3.0);
    }

    #[test]
    fn test_malformed_filter_is_an_error() {
        let data = rows(vec![json!({"amount": 1})]);
        let resolver = resolver();
        for condition in [
            FilterCondition::new("amount", FilterOperator::GreaterThan, json!("muito")),
            FilterCondition::new("id", FilterOperator::In, json!("1,2")),
            FilterCondition::new("amount", FilterOperator::Between, json!([1])),
            FilterCondition::new("amount", FilterOperator::Between, json!([1, "2024-01-01"])),
            FilterCondition::new("", FilterOperator::Equals, json!(1)),
        ] {
            let query = MetricsQuery::for_metric("receita_total").with_filters(FilterGroup::all(vec![condition]));
            let err = resolver.resolve(&query, &data).unwrap_err();
            assert!(matches!(err, ResolveError::InvalidFilter { .. }), "got {:?}", err);
            assert!(!err.is_configuration());
        }
    }

    #[test]
    fn test_unknown_references() {
        let resolver = resolver();
        let err = resolver.resolve(&MetricsQuery::for_metric("lucro"), &[]).unwrap_err();
        assert_eq!(err, ResolveError::UnknownMetric("lucro".to_string()));
        assert!(err.is_configuration());

        let query = MetricsQuery::for_metric("receita_total").with_dimension("por_minuto");
        let err = resolver.resolve(&query, &[]).unwrap_err();
        assert_eq!(err, ResolveError::UnknownDimension("por_minuto".to_string()));

        assert_eq!(resolver.resolve(&MetricsQuery::default(), &[]).unwrap_err(), ResolveError::MissingMetric);
    }

    #[test]
    fn test_date_range_and_previous_period() {
        // now = 2024-06-30 12:00; last 7 days covers 06-23 12:00 ..= 06-30 12:00
        let data = rows(vec![
            json!({"date": "2024-06-29", "amount": 100}),
            json!({"date": "2024-06-25", "amount": 50}),
            json!({"date": "2024-06-20", "amount": 60}),
            json!({"date": "2024-06-01", "amount": 999}),
        ]);
        let query = MetricsQuery::for_metric("receita_total").with_date_range(DateRange::preset(DatePreset::Last7Days));
        let points = resolver().resolve(&query, &data).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 150.0);
        assert_eq!(points[0].previous_value, Some(60.0));
    }

    #[test]
    fn test_previous_period_by_category() {
        let data = rows(vec![
            json!({"date": "2024-06-29", "status": "pago", "amount": 100}),
            json!({"date": "2024-06-28", "status": "pendente", "amount": 30}),
            json!({"date": "2024-06-20", "status": "pago", "amount": 80}),
        ]);
        let query = MetricsQuery::for_metric("receita_total")
            .with_dimension("status")
            .with_date_range(DateRange::preset(DatePreset::Last7Days));
        let points = resolver().resolve(&query, &data).unwrap();
        assert_eq!(points[0].label, "pago");
        assert_eq!(points[0].previous_value, Some(80.0));
        assert_eq!(points[1].label, "pendente");
        assert_eq!(points[1].previous_value, None);
    }

    #[test]
    fn test_invalid_custom_range() {
        let query = MetricsQuery::for_metric("receita_total")
            .with_date_range(DateRange::custom("2024-05-01", "ontem"));
        let err = resolver().resolve(&query, &[]).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidDateRange(_)));
    }

    #[test]
    fn test_widest_custom_range_has_no_previous_period() {
        let data = rows(vec![json!({"date": "2024-06-29", "amount": 100})]);
        let query = MetricsQuery::for_metric("receita_total")
            .with_date_range(DateRange::custom("-262000-01-01", "+262000-01-01"));
        let points = resolver().resolve(&query, &data).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 100.0);
        assert_eq!(points[0].previous_value, None);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let data = rows(vec![
            json!({"date": "2024-06-10", "status": "pago", "amount": 10}),
            json!({"date": "2024-06-11", "status": "pendente", "amount": 20}),
            json!({"date": "2024-06-10", "status": "pago", "amount": 5}),
        ]);
        let query = MetricsQuery::for_metric("receita_total")
            .with_dimension("por_dia")
            .with_date_range(DateRange::preset(DatePreset::Last30Days));
        let resolver = resolver();
        assert_eq!(resolver.resolve(&query, &data).unwrap(), resolver.resolve(&query, &data).unwrap());
    }
}
