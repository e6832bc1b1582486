// Main entry point - Wiring and a demo dashboard render
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use canvas_dashboard::application::dashboard_service::{DashboardService, DashboardSession};
use canvas_dashboard::application::dimension_registry::DimensionRegistry;
use canvas_dashboard::application::grid_engine::GestureKind;
use canvas_dashboard::application::layout_persistence::LayoutPersistence;
use canvas_dashboard::application::metric_registry::MetricRegistry;
use canvas_dashboard::application::query_resolver::QueryResolver;
use canvas_dashboard::domain::component::{ComponentProps, ComponentType, DataBinding, TextProps};
use canvas_dashboard::domain::query::{DatePreset, DateRange, MetricsQuery};
use canvas_dashboard::infrastructure::config::load_canvas_config;
use canvas_dashboard::infrastructure::file_store::FileLayoutStore;
use canvas_dashboard::infrastructure::json_row_source::JsonRowSource;
use canvas_dashboard::infrastructure::synthetic_source::SyntheticSource;

const DEMO_DASHBOARD: &str = "demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_canvas_config().context("Failed to load canvas configuration")?;

    // Registries and resolver (application layer)
    let metrics = MetricRegistry::builtin();
    let dimensions = DimensionRegistry::builtin();
    let resolver = QueryResolver::new(metrics.clone(), dimensions.clone()).with_date_field(&config.resolver.date_field);

    // Storage and data (infrastructure layer)
    let persistence = LayoutPersistence::new(Arc::new(FileLayoutStore::new(&config.storage.dir)));
    let mut service = DashboardService::new(
        persistence,
        resolver,
        config.theme.context(),
        config.grid.spec(),
        config.overlap_policy,
    );
    service = match &config.data.rows_path {
        Some(path) => service.with_rows(Arc::new(JsonRowSource::new(path))),
        None => service.with_synthetic(Arc::new(SyntheticSource::new(
            config.data.synthetic_seed,
            metrics,
            dimensions,
        ))),
    };

    let mut session = service.open(DEMO_DASHBOARD).await?;
    if session.engine().is_empty() {
        seed_demo(&mut session);
        tracing::info!("Seeded dashboard {} with {} cards", DEMO_DASHBOARD, session.engine().len());
    }

    let visuals = session.render_all();
    println!("{}", serde_json::to_string_pretty(&visuals)?);

    service.save(&session).await?;
    tracing::info!("Saved dashboard {} ({} cards)", session.id(), visuals.len());

    Ok(())
}

fn seed_demo(session: &mut DashboardSession) {
    let engine = session.engine_mut();

    if let Some(id) = engine.add_component(ComponentType::Text) {
        engine.update_props(
            &id,
            ComponentProps::Text(TextProps {
                text: "Visão geral do condomínio".to_string(),
                ..Default::default()
            }),
        );
        engine.resize(&id, 12, 1);
    }

    let bindings = [
        (ComponentType::Value, MetricsQuery::for_metric("receita_total")),
        (ComponentType::Trend, MetricsQuery::for_metric("inadimplencia")),
        (ComponentType::Gauge, MetricsQuery::for_metric("taxa_ocupacao")),
        (ComponentType::Value, MetricsQuery::for_metric("ocorrencias")),
        (
            ComponentType::LineChart,
            MetricsQuery::for_metric("receita_total")
                .with_dimension("por_mes")
                .with_date_range(DateRange::preset(DatePreset::LastYear)),
        ),
        (ComponentType::PieChart, MetricsQuery::for_metric("ocorrencias").with_dimension("categoria")),
        (ComponentType::Table, MetricsQuery::for_metric("despesa_total").with_dimension("status")),
    ];
    for (component_type, query) in bindings {
        if let Some(id) = engine.add_component(component_type) {
            engine.bind(&id, Some(DataBinding::metrics(query)));
        }
    }

    // A card left for the user to configure
    if let Some(id) = engine.add_component(ComponentType::BarChart) {
        engine.begin_gesture(&id, GestureKind::Resize);
        engine.update_gesture(0.0, -60.0);
        engine.end_gesture();
    }
}
