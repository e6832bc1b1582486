// Dimension domain model
use serde::{Deserialize, Serialize};

/// Truncation unit for temporal dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DimensionKind {
    Temporal { granularity: Granularity },
    Categorical {
        #[serde(default)]
        options: Vec<String>,
    },
    /// Fixed-width bins over a numeric field, ordered ascending
    Numeric { bucket_width: f64 },
}

/// A groupable dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDefinition {
    pub id: String,
    pub name: String,
    /// Row field the dimension buckets on
    pub field: String,
    pub kind: DimensionKind,
}

impl DimensionDefinition {
    pub fn temporal(id: &str, name: &str, field: &str, granularity: Granularity) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            field: field.to_string(),
            kind: DimensionKind::Temporal { granularity },
        }
    }

    pub fn categorical(id: &str, name: &str, field: &str, options: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            field: field.to_string(),
            kind: DimensionKind::Categorical {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        }
    }

    pub fn numeric(id: &str, name: &str, field: &str, bucket_width: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            field: field.to_string(),
            kind: DimensionKind::Numeric { bucket_width },
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self.kind, DimensionKind::Temporal { .. })
    }
}
