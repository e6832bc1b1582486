// Dashboard canvas builder - grid editing, metric queries and card rendering
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::card_renderer::{CardData, CardRenderer};
pub use application::compatibility::CompatibilityChecker;
pub use application::dashboard_service::{DashboardService, DashboardSession};
pub use application::grid_engine::{GridEngine, OverlapPolicy};
pub use application::query_resolver::{QueryResolver, ResolveError};
pub use domain::catalog::catalog;
