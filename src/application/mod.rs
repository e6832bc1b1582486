// Application layer - Registries, resolution, editing and rendering use cases
pub mod card_renderer;
pub mod compatibility;
pub mod dashboard_service;
pub mod data_source;
pub mod dimension_registry;
pub mod grid_engine;
pub mod layout_persistence;
pub mod layout_store;
pub mod metric_registry;
pub mod query_resolver;
pub mod temporal;
