// Data source traits - Where cards get their rows and series
use crate::application::query_resolver::{QueryResolver, ResolveError};
use crate::domain::chart::{ChartDataPoint, TabularRow};
use crate::domain::query::MetricsQuery;
use async_trait::async_trait;

/// Tabular records for one dashboard, fetched once per open
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self) -> anyhow::Result<Vec<TabularRow>>;
}

/// Turns a card's query into points. Implementations are synchronous and deterministic.
pub trait SeriesSource: Send + Sync {
    fn series(&self, query: &MetricsQuery) -> Result<Vec<ChartDataPoint>, ResolveError>;
}

/// Rows already in memory, resolved through a [`QueryResolver`]
#[derive(Debug, Clone)]
pub struct Dataset {
    resolver: QueryResolver,
    rows: Vec<TabularRow>,
}

impl Dataset {
    pub fn new(resolver: QueryResolver, rows: Vec<TabularRow>) -> Self {
        Self { resolver, rows }
    }

    pub fn rows(&self) -> &[TabularRow] {
        &self.rows
    }

    pub fn resolver(&self) -> &QueryResolver {
        &self.resolver
    }
}

impl SeriesSource for Dataset {
    fn series(&self, query: &MetricsQuery) -> Result<Vec<ChartDataPoint>, ResolveError> {
        self.resolver.resolve(query, &self.rows)
    }
}
