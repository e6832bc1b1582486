// Dashboard service - Open, render and save canvas dashboards
use crate::application::card_renderer::{BindingState, CardData, CardRenderer};
use crate::application::data_source::{Dataset, RowSource, SeriesSource};
use crate::application::dimension_registry::DimensionRegistry;
use crate::application::grid_engine::{GridEngine, OverlapPolicy};
use crate::application::layout_persistence::LayoutPersistence;
use crate::application::metric_registry::MetricRegistry;
use crate::application::query_resolver::QueryResolver;
use crate::domain::chart::TabularRow;
use crate::domain::component::CanvasComponent;
use crate::domain::dashboard::{ColorScheme, DashboardLayout};
use crate::domain::geometry::GridSpec;
use crate::domain::theme::ThemeContext;
use crate::domain::visual::VisualDescription;
use anyhow::Context;
use std::sync::Arc;

const DATA_UNAVAILABLE_MESSAGE: &str = "Não foi possível carregar os dados";

/// Where a session's cards get their points
#[derive(Clone)]
pub enum SessionData {
    /// Nothing to resolve against yet; cards show as loading
    Pending,
    /// The row fetch failed; cards show this message
    Unavailable(String),
    Ready(Arc<dyn SeriesSource>),
}

#[derive(Clone)]
pub struct DashboardService {
    persistence: LayoutPersistence,
    rows: Option<Arc<dyn RowSource>>,
    synthetic: Option<Arc<dyn SeriesSource>>,
    resolver: QueryResolver,
    metrics: Arc<MetricRegistry>,
    dimensions: Arc<DimensionRegistry>,
    theme: ThemeContext,
    grid: GridSpec,
    policy: OverlapPolicy,
}

impl DashboardService {
    pub fn new(
        persistence: LayoutPersistence,
        resolver: QueryResolver,
        theme: ThemeContext,
        grid: GridSpec,
        policy: OverlapPolicy,
    ) -> Self {
        let metrics = resolver.metrics().clone();
        let dimensions = resolver.dimensions().clone();
        Self {
            persistence,
            rows: None,
            synthetic: None,
            resolver,
            metrics,
            dimensions,
            theme,
            grid,
            policy,
        }
    }

    /// Resolve cards against rows fetched from `rows` on each open
    pub fn with_rows(mut self, rows: Arc<dyn RowSource>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Serve cards from a series source when no row source is set
    pub fn with_synthetic(mut self, source: Arc<dyn SeriesSource>) -> Self {
        self.synthetic = Some(source);
        self
    }

    /// Load the layout and the rows together; the rows are fetched once for the whole dashboard
    pub async fn open(&self, dashboard_id: &str) -> anyhow::Result<DashboardSession> {
        let (layout, rows) = tokio::join!(self.persistence.load(dashboard_id), self.fetch_rows());
        let mut layout = layout.with_context(|| format!("Failed to load dashboard {}", dashboard_id))?;

        let data = match rows {
            Some(Ok(rows)) => SessionData::Ready(Arc::new(Dataset::new(self.resolver.clone(), rows))),
            Some(Err(e)) => {
                tracing::warn!("Rows for dashboard {} unavailable: {:#}", dashboard_id, e);
                SessionData::Unavailable(DATA_UNAVAILABLE_MESSAGE.to_string())
            }
            None => match &self.synthetic {
                Some(source) => SessionData::Ready(source.clone()),
                None => SessionData::Pending,
            },
        };

        let spec = if layout.is_empty() {
            layout.color_scheme = self.theme.scheme;
            self.grid
        } else {
            GridSpec {
                cell_width_px: self.grid.cell_width_px,
                cell_height_px: self.grid.cell_height_px,
                ..GridSpec::new(layout.grid_cols, layout.grid_rows)
            }
        };

        tracing::debug!(
            "Opened dashboard {} with {} components",
            dashboard_id,
            layout.components.len()
        );

        Ok(DashboardSession {
            id: dashboard_id.to_string(),
            name: layout.name,
            renderer: self.renderer_for(layout.color_scheme),
            engine: GridEngine::from_components(spec, self.policy, layout.components),
            data,
        })
    }

    pub async fn save(&self, session: &DashboardSession) -> anyhow::Result<()> {
        self.persistence
            .save(&session.id, &session.layout())
            .await
            .with_context(|| format!("Failed to save dashboard {}", session.id))
    }

    pub async fn delete(&self, dashboard_id: &str) -> anyhow::Result<bool> {
        self.persistence
            .delete(dashboard_id)
            .await
            .with_context(|| format!("Failed to delete dashboard {}", dashboard_id))
    }

    pub async fn list(&self) -> anyhow::Result<Vec<String>> {
        self.persistence.list().await.context("Failed to list dashboards")
    }

    pub fn renderer_for(&self, scheme: ColorScheme) -> CardRenderer {
        let theme = ThemeContext {
            scheme,
            ..self.theme.clone()
        };
        CardRenderer::new(theme, self.metrics.clone(), self.dimensions.clone())
    }

    async fn fetch_rows(&self) -> Option<anyhow::Result<Vec<TabularRow>>> {
        match &self.rows {
            Some(source) => Some(source.fetch_rows().await),
            None => None,
        }
    }
}

/// One open dashboard: the editable grid plus what its cards draw from
pub struct DashboardSession {
    id: String,
    name: String,
    engine: GridEngine,
    renderer: CardRenderer,
    data: SessionData,
}

impl DashboardSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GridEngine {
        &mut self.engine
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.renderer.theme().scheme
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme, service: &DashboardService) {
        self.renderer = service.renderer_for(scheme);
    }

    pub fn set_data(&mut self, data: SessionData) {
        self.data = data;
    }

    /// Snapshot for saving
    pub fn layout(&self) -> DashboardLayout {
        let spec = self.engine.spec();
        DashboardLayout {
            name: self.name.clone(),
            grid_cols: spec.cols,
            grid_rows: spec.rows,
            color_scheme: self.color_scheme(),
            components: self.engine.components().to_vec(),
        }
    }

    /// Render every card in layout order. A card that fails to resolve shows its own error.
    pub fn render_all(&self) -> Vec<VisualDescription> {
        self.engine
            .components()
            .iter()
            .map(|component| self.render_component(component))
            .collect()
    }

    pub fn render(&self, component_id: &str) -> Option<VisualDescription> {
        self.engine.get(component_id).map(|c| self.render_component(c))
    }

    fn render_component(&self, component: &CanvasComponent) -> VisualDescription {
        let data = self.card_data(component);
        self.renderer.render(component, &data)
    }

    fn card_data(&self, component: &CanvasComponent) -> CardData {
        match self.renderer.binding_state(component) {
            BindingState::Static(points) => CardData::Points(points.to_vec()),
            BindingState::Query(query) => match &self.data {
                SessionData::Pending => CardData::Loading,
                SessionData::Unavailable(message) => CardData::Failed(message.clone()),
                SessionData::Ready(source) => match source.series(query) {
                    Ok(points) => CardData::Points(points),
                    Err(e) => {
                        tracing::warn!("Card {} failed to resolve: {}", component.id, e);
                        CardData::Failed(e.to_string())
                    }
                },
            },
            // Drawn from props or shown as a placeholder; nothing to resolve
            BindingState::Unbound | BindingState::Unconfigured | BindingState::Disabled(_) => {
                CardData::Points(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query_resolver::ResolveError;
    use crate::domain::chart::ChartDataPoint;
    use crate::domain::component::{ComponentType, DataBinding};
    use crate::domain::query::{FilterCondition, FilterGroup, FilterOperator, MetricsQuery};
    use crate::domain::visual::VisualBody;
    use crate::infrastructure::json_row_source::StaticRowSource;
    use crate::infrastructure::memory_store::MemoryLayoutStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl SeriesSource for CountingSource {
        fn series(&self, _query: &MetricsQuery) -> Result<Vec<ChartDataPoint>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ChartDataPoint::new("x", 1.0)])
        }
    }

    struct BrokenRows;

    #[async_trait]
    impl RowSource for BrokenRows {
        async fn fetch_rows(&self) -> anyhow::Result<Vec<TabularRow>> {
            anyhow::bail!("disk on fire")
        }
    }

    fn service() -> DashboardService {
        DashboardService::new(
            LayoutPersistence::new(Arc::new(MemoryLayoutStore::new())),
            QueryResolver::builtin(),
            ThemeContext::default(),
            GridSpec::default(),
            OverlapPolicy::Allow,
        )
    }

    fn rows() -> Vec<TabularRow> {
        [
            json!({"amount": 10, "status": "pago"}),
            json!({"amount": 20, "status": "pendente"}),
            json!({"amount": 30, "status": "pago"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
    }

    #[tokio::test]
    async fn test_open_edit_save_reopen() {
        let service = service().with_rows(Arc::new(StaticRowSource::new(rows())));
        let mut session = service.open("financeiro").await.unwrap();
        assert!(session.engine().is_empty());

        let id = session.engine_mut().add_component(ComponentType::Value).unwrap();
        session
            .engine_mut()
            .bind(&id, Some(DataBinding::metrics(MetricsQuery::for_metric("receita_total"))));

        let visuals = session.render_all();
        match &visuals[0].body {
            VisualBody::Value { value, .. } => assert_eq!(*value, 60.0),
            other => panic!("expected value, got {:?}", other),
        }

        service.save(&session).await.unwrap();
        let reopened = service.open("financeiro").await.unwrap();
        assert_eq!(reopened.layout(), session.layout());
        assert_eq!(service.list().await.unwrap(), vec!["financeiro".to_string()]);
    }

    #[tokio::test]
    async fn test_card_failures_stay_local() {
        let service = service().with_rows(Arc::new(StaticRowSource::new(rows())));
        let mut session = service.open("ops").await.unwrap();
        let engine = session.engine_mut();

        let good = engine.add_component(ComponentType::Value).unwrap();
        engine.bind(&good, Some(DataBinding::metrics(MetricsQuery::for_metric("receita_total"))));
        let bad = engine.add_component(ComponentType::Value).unwrap();
        let broken = MetricsQuery::for_metric("receita_total").with_filters(FilterGroup::all(vec![
            FilterCondition::new("amount", FilterOperator::Between, json!("muito")),
        ]));
        engine.bind(&bad, Some(DataBinding::metrics(broken)));

        assert!(matches!(session.render(&good).unwrap().body, VisualBody::Value { .. }));
        assert!(matches!(session.render(&bad).unwrap().body, VisualBody::Error { .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_cards_never_resolve() {
        let counting = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let service = service().with_synthetic(counting.clone());
        let mut session = service.open("vazio").await.unwrap();
        let engine = session.engine_mut();
        engine.add_component(ComponentType::BarChart).unwrap();
        let disabled = engine.add_component(ComponentType::Value).unwrap();
        engine.bind(&disabled, Some(DataBinding::metrics(MetricsQuery::for_metric("lucro"))));
        engine.add_component(ComponentType::Text).unwrap();

        let visuals = session.render_all();
        assert!(matches!(visuals[0].body, VisualBody::Unconfigured { .. }));
        assert!(matches!(visuals[1].body, VisualBody::Disabled { .. }));
        assert!(matches!(visuals[2].body, VisualBody::Text { .. }));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_or_failed_rows() {
        let mut session = service().open("a").await.unwrap();
        let id = session.engine_mut().add_component(ComponentType::LineChart).unwrap();
        session
            .engine_mut()
            .bind(&id, Some(DataBinding::metrics(MetricsQuery::for_metric("ocorrencias"))));
        assert_eq!(session.render(&id).unwrap().body, VisualBody::Loading);

        let failing = service().with_rows(Arc::new(BrokenRows));
        let mut session = failing.open("a").await.unwrap();
        let id = session.engine_mut().add_component(ComponentType::LineChart).unwrap();
        session
            .engine_mut()
            .bind(&id, Some(DataBinding::metrics(MetricsQuery::for_metric("ocorrencias"))));
        assert!(matches!(session.render(&id).unwrap().body, VisualBody::Error { .. }));
    }

    #[tokio::test]
    async fn test_color_scheme_persists() {
        let service = service();
        let mut session = service.open("cores").await.unwrap();
        session.engine_mut().add_component(ComponentType::Text).unwrap();
        session.set_color_scheme(ColorScheme::Sunset, &service);
        service.save(&session).await.unwrap();

        let reopened = service.open("cores").await.unwrap();
        assert_eq!(reopened.color_scheme(), ColorScheme::Sunset);
        assert!(service.delete("cores").await.unwrap());
    }
}
