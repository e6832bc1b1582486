// Dashboard layout domain model
use super::component::CanvasComponent;
use super::geometry::{DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS};
use serde::{Deserialize, Serialize};

/// Named palette applied to every card of a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Ocean,
    Sunset,
    Forest,
    Monochrome,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Default => "default",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Sunset => "sunset",
            ColorScheme::Forest => "forest",
            ColorScheme::Monochrome => "monochrome",
        }
    }

    /// Unknown names fall back to the default palette
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ocean" => ColorScheme::Ocean,
            "sunset" => ColorScheme::Sunset,
            "forest" => ColorScheme::Forest,
            "monochrome" | "mono" => ColorScheme::Monochrome,
            _ => ColorScheme::Default,
        }
    }

    pub fn palette(&self) -> &'static [&'static str] {
        match self {
            ColorScheme::Default => &[
                "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#ec4899", "#84cc16",
            ],
            ColorScheme::Ocean => &[
                "#0ea5e9", "#0284c7", "#0369a1", "#22d3ee", "#14b8a6", "#0f766e", "#38bdf8", "#1e3a8a",
            ],
            ColorScheme::Sunset => &[
                "#f97316", "#ef4444", "#f59e0b", "#e11d48", "#fb7185", "#facc15", "#c2410c", "#9f1239",
            ],
            ColorScheme::Forest => &[
                "#16a34a", "#65a30d", "#15803d", "#4d7c0f", "#22c55e", "#a3e635", "#166534", "#84cc16",
            ],
            ColorScheme::Monochrome => &[
                "#111827", "#374151", "#4b5563", "#6b7280", "#9ca3af", "#d1d5db", "#1f2937", "#e5e7eb",
            ],
        }
    }
}

/// A named, ordered set of placed components
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardLayout {
    pub name: String,
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub color_scheme: ColorScheme,
    pub components: Vec<CanvasComponent>,
}

impl DashboardLayout {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            grid_cols: DEFAULT_GRID_COLS,
            grid_rows: DEFAULT_GRID_ROWS,
            color_scheme: ColorScheme::Default,
            components: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
