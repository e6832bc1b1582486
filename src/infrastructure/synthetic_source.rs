// Synthetic series - Seeded demo data shaped like real resolver output
use crate::application::data_source::SeriesSource;
use crate::application::dimension_registry::DimensionRegistry;
use crate::application::metric_registry::MetricRegistry;
use crate::application::query_resolver::ResolveError;
use crate::application::temporal::{bucket_label, to_timestamp_string, truncate};
use crate::domain::chart::ChartDataPoint;
use crate::domain::dimension::{DimensionKind, Granularity};
use crate::domain::metric::{AggregationKind, MetricDefinition, ValueFormat};
use crate::domain::query::MetricsQuery;
use chrono::{DateTime, Duration, Months, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const FALLBACK_CATEGORIES: [&str; 4] = ["A", "B", "C", "D"];
const NUMERIC_BINS: usize = 5;

/// Same seed, anchor and query always give the same points
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    anchor: DateTime<Utc>,
    metrics: Arc<MetricRegistry>,
    dimensions: Arc<DimensionRegistry>,
}

impl SyntheticSource {
    pub fn new(seed: u64, metrics: Arc<MetricRegistry>, dimensions: Arc<DimensionRegistry>) -> Self {
        Self {
            seed,
            anchor: Utc::now(),
            metrics,
            dimensions,
        }
    }

    /// Instant the newest temporal bucket contains
    pub fn at(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    fn rng_for(&self, query: &MetricsQuery) -> StdRng {
        let key = format!(
            "{}|{}|{:?}",
            query.metric_id().unwrap_or_default(),
            query.dimension_id().unwrap_or_default(),
            query.aggregation
        );
        StdRng::seed_from_u64(self.seed ^ fnv1a(key.as_bytes()))
    }
}

impl SeriesSource for SyntheticSource {
    fn series(&self, query: &MetricsQuery) -> Result<Vec<ChartDataPoint>, ResolveError> {
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

        let mut rng = self.rng_for(query);
        let aggregation = query.aggregation.unwrap_or(metric.aggregation);
        let compare = query.date_range.is_some();

        let points = match dimension.map(|d| &d.kind) {
            None => {
                let value = sample(&mut rng, metric, aggregation);
                let point = ChartDataPoint::new(metric.name.clone(), value);
                vec![if compare {
                    let previous = drift(&mut rng, value, metric.format);
                    point.with_previous(previous)
                } else {
                    point
                }]
            }
            Some(DimensionKind::Temporal { granularity }) => {
                let starts = bucket_starts(self.anchor, *granularity);
                let mut value = sample(&mut rng, metric, aggregation);
                starts
                    .into_iter()
                    .map(|start| {
                        value = drift(&mut rng, value, metric.format);
                        ChartDataPoint::new(bucket_label(start, *granularity), value)
                            .with_timestamp(to_timestamp_string(start))
                    })
                    .collect()
            }
            Some(DimensionKind::Categorical { options }) => {
                let labels: Vec<String> = if options.is_empty() {
                    FALLBACK_CATEGORIES.iter().map(|s| s.to_string()).collect()
                } else {
                    options.clone()
                };
                labels
                    .into_iter()
                    .map(|label| {
                        let value = sample(&mut rng, metric, aggregation);
                        ChartDataPoint::new(label.clone(), value).with_category(label)
                    })
                    .collect()
            }
            Some(DimensionKind::Numeric { bucket_width }) => (0..NUMERIC_BINS)
                .map(|bin| {
                    let low = bin as f64 * bucket_width;
                    let value = sample(&mut rng, metric, AggregationKind::Count);
                    ChartDataPoint::new(format!("{}-{}", low, low + bucket_width), value)
                })
                .collect(),
        };

        tracing::debug!("Generated {} synthetic points for {}", points.len(), metric.id);
        Ok(points)
    }
}

/// Oldest first, ending with the bucket that contains `anchor`
fn bucket_starts(anchor: DateTime<Utc>, granularity: Granularity) -> Vec<DateTime<Utc>> {
    let Some(last) = truncate(anchor, granularity) else {
        return Vec::new();
    };
    let count: u32 = match granularity {
        Granularity::Hour => 24,
        Granularity::Day => 14,
        Granularity::Week => 8,
        Granularity::Month => 12,
        Granularity::Quarter => 4,
        Granularity::Year => 5,
    };

    let mut starts: Vec<DateTime<Utc>> = (0..count)
        .filter_map(|back| match granularity {
            Granularity::Hour => Some(last - Duration::hours(i64::from(back))),
            Granularity::Day => Some(last - Duration::days(i64::from(back))),
            Granularity::Week => Some(last - Duration::weeks(i64::from(back))),
            Granularity::Month => last.checked_sub_months(Months::new(back)),
            Granularity::Quarter => last.checked_sub_months(Months::new(back * 3)),
            Granularity::Year => last.checked_sub_months(Months::new(back * 12)),
        })
        .collect();
    starts.reverse();
    starts
}

fn sample(rng: &mut StdRng, metric: &MetricDefinition, aggregation: AggregationKind) -> f64 {
    if aggregation == AggregationKind::Count {
        return f64::from(rng.gen_range(5_u32..200));
    }
    let value = match metric.format {
        ValueFormat::Percent => rng.gen_range(40.0..95.0),
        ValueFormat::Currency => rng.gen_range(1_000.0..50_000.0),
        ValueFormat::Duration => rng.gen_range(10.0..120.0),
        ValueFormat::Integer => rng.gen_range(5.0..200.0_f64).round(),
        ValueFormat::Number => rng.gen_range(1.0..10.0),
    };
    round_for(value, metric.format)
}

/// Next value of a gentle random walk, up to 15% either way
fn drift(rng: &mut StdRng, value: f64, format: ValueFormat) -> f64 {
    let factor = rng.gen_range(0.85..1.15);
    let next = (value * factor).max(0.0);
    match format {
        ValueFormat::Percent => round_for(next.min(100.0), format),
        _ => round_for(next, format),
    }
}

fn round_for(value: f64, format: ValueFormat) -> f64 {
    match format {
        ValueFormat::Integer => value.round(),
        _ => (value * 100.0).round() / 100.0,
    }
}

/// FNV-1a, stable across runs and platforms
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
