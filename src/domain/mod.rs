// Domain layer - Pure value types of the canvas builder
pub mod catalog;
pub mod chart;
pub mod component;
pub mod dashboard;
pub mod dimension;
pub mod geometry;
pub mod metric;
pub mod query;
pub mod theme;
pub mod visual;
