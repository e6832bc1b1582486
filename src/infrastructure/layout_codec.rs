// Layout codec - Versioned JSON shape of a stored dashboard
use crate::domain::component::CanvasComponent;
use crate::domain::dashboard::{ColorScheme, DashboardLayout};
use crate::domain::geometry::{DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
use serde::{Deserialize, Serialize};

/// Bump when the stored shape changes; older layouts then load empty
pub const LAYOUT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredLayoutRef<'a> {
    version: u32,
    name: &'a str,
    grid_cols: u32,
    grid_rows: u32,
    color_scheme: &'a str,
    components: &'a [CanvasComponent],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLayout {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    grid_cols: Option<u32>,
    #[serde(default)]
    grid_rows: Option<u32>,
    #[serde(default)]
    color_scheme: Option<String>,
    #[serde(default)]
    components: Vec<serde_json::Value>,
}

pub fn encode(layout: &DashboardLayout) -> Result<String, serde_json::Error> {
    serde_json::to_string(&StoredLayoutRef {
        version: LAYOUT_VERSION,
        name: &layout.name,
        grid_cols: layout.grid_cols,
        grid_rows: layout.grid_rows,
        color_scheme: layout.color_scheme.as_str(),
        components: &layout.components,
    })
}

/// Decode a stored layout, never failing.
///
/// Unreadable JSON or another schema version gives an empty layout named `fallback_name`.
/// Components that do not decode are dropped one by one.
pub fn decode(json: &str, fallback_name: &str) -> DashboardLayout {
    let stored: StoredLayout = match serde_json::from_str(json) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("Stored layout '{}' is unreadable, starting empty: {}", fallback_name, e);
            return DashboardLayout::empty(fallback_name);
        }
    };

    if stored.version != Some(LAYOUT_VERSION) {
        tracing::warn!(
            "Stored layout '{}' has version {:?}, expected {}; starting empty",
            fallback_name,
            stored.version,
            LAYOUT_VERSION
        );
        return DashboardLayout::empty(fallback_name);
    }

    let total = stored.components.len();
    let components: Vec<CanvasComponent> = stored
        .components
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<CanvasComponent>(value) {
            Ok(component) => Some(component),
            Err(e) => {
                tracing::warn!("Dropping undecodable component from '{}': {}", fallback_name, e);
                None
            }
        })
        .collect();
    if components.len() < total {
        tracing::warn!("Loaded {} of {} components of '{}'", components.len(), total, fallback_name);
    }

    DashboardLayout {
        name: stored
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string()),
        grid_cols: stored.grid_cols.filter(|c| *c > 0).unwrap_or(DEFAULT_GRID_COLS),
        grid_rows: stored.grid_rows.filter(|r| *r > 0).unwrap_or(DEFAULT_GRID_ROWS),
        color_scheme: stored
            .color_scheme
            .as_deref()
            .map(ColorScheme::from_name)
            .unwrap_or_default(),
        components,
    }
}
