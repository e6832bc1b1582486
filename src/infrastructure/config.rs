use crate::application::dimension_registry::DEFAULT_DATE_FIELD;
use crate::application::grid_engine::OverlapPolicy;
use crate::domain::dashboard::ColorScheme;
use crate::domain::geometry::{
    DEFAULT_CELL_HEIGHT_PX, DEFAULT_CELL_WIDTH_PX, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, GridSpec,
};
use crate::domain::theme::ThemeContext;
use serde::Deserialize;

/// Prefix of environment overrides, e.g. `CANVAS__GRID__COLS=24`
pub const ENV_PREFIX: &str = "CANVAS";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CanvasConfig {
    pub grid: GridSettings,
    pub overlap_policy: OverlapPolicy,
    pub resolver: ResolverSettings,
    pub storage: StorageSettings,
    pub data: DataSettings,
    pub theme: ThemeSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GridSettings {
    pub cols: u32,
    pub rows: u32,
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cols: DEFAULT_GRID_COLS,
            rows: DEFAULT_GRID_ROWS,
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            cell_height_px: DEFAULT_CELL_HEIGHT_PX,
        }
    }
}

impl GridSettings {
    pub fn spec(&self) -> GridSpec {
        GridSpec {
            cell_width_px: self.cell_width_px,
            cell_height_px: self.cell_height_px,
            ..GridSpec::new(self.cols, self.rows)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResolverSettings {
    /// Row field date ranges filter on
    pub date_field: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            date_field: DEFAULT_DATE_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageSettings {
    pub dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: "data/layouts".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataSettings {
    /// JSON array of rows; synthetic series are used when unset
    pub rows_path: Option<String>,
    pub synthetic_seed: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            rows_path: None,
            synthetic_seed: 42,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThemeSettings {
    pub color_scheme: String,
    pub currency_symbol: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Default.as_str().to_string(),
            currency_symbol: "R$".to_string(),
        }
    }
}

impl ThemeSettings {
    pub fn context(&self) -> ThemeContext {
        ThemeContext::new(ColorScheme::from_name(&self.color_scheme)).with_currency_symbol(&self.currency_symbol)
    }
}

/// Defaults, then `config/canvas.{toml,json,...}` if present, then `CANVAS__*` variables
pub fn load_canvas_config() -> anyhow::Result<CanvasConfig> {
    load_canvas_config_from("config/canvas", config::Environment::with_prefix(ENV_PREFIX))
}

pub fn load_canvas_config_from(file: &str, env: config::Environment) -> anyhow::Result<CanvasConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(file).required(false))
        .add_source(env.separator("__").try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}
