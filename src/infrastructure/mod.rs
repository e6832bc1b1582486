// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_store;
pub mod json_row_source;
pub mod layout_codec;
pub mod memory_store;
pub mod synthetic_source;
