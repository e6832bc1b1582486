// Row sources - JSON file and in-memory tabular data
use crate::application::data_source::RowSource;
use crate::domain::chart::TabularRow;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads a JSON array of objects. Entries that are not objects are skipped.
#[derive(Debug, Clone)]
pub struct JsonRowSource {
    path: PathBuf,
}

impl JsonRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse a JSON array of row objects
pub fn parse_rows(json: &str) -> Result<Vec<TabularRow>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Rows must be a JSON array")?;
    let total = values.len();
    let rows: Vec<TabularRow> = values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();
    if rows.len() < total {
        tracing::warn!("Skipped {} non-object rows", total - rows.len());
    }
    Ok(rows)
}

#[async_trait]
impl RowSource for JsonRowSource {
    async fn fetch_rows(&self) -> Result<Vec<TabularRow>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read rows from {}", self.path.display()))?;
        let rows = parse_rows(&json).with_context(|| format!("Failed to parse {}", self.path.display()))?;
        tracing::debug!("Loaded {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

/// Rows held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticRowSource {
    rows: Vec<TabularRow>,
}

impl StaticRowSource {
    pub fn new(rows: Vec<TabularRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RowSource for StaticRowSource {
    async fn fetch_rows(&self) -> Result<Vec<TabularRow>> {
        Ok(self.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_skips_non_objects() {
        let rows = parse_rows(r#"[{"amount": 1}, 3, "x", {"amount": 2}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(parse_rows(r#"{"amount": 1}"#).is_err());
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(&path, r#"[{"date": "2024-01-01", "amount": 10}]"#)
            .await
            .unwrap();

        let rows = JsonRowSource::new(&path).fetch_rows().await.unwrap();
        assert_eq!(rows[0]["amount"], 10);

        let missing = JsonRowSource::new(dir.path().join("missing.json")).fetch_rows().await;
        assert!(missing.is_err());
    }
}
