// Explicit rendering theme
use super::dashboard::ColorScheme;
use super::metric::ValueFormat;

/// Colors and formatting handed to the card renderer at construction
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeContext {
    pub scheme: ColorScheme,
    pub muted: String,
    pub positive: String,
    pub negative: String,
    pub currency_symbol: String,
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new(ColorScheme::Default)
    }
}

impl ThemeContext {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            muted: "#9ca3af".to_string(),
            positive: "#16a34a".to_string(),
            negative: "#dc2626".to_string(),
            currency_symbol: "R$".to_string(),
        }
    }

    pub fn with_currency_symbol(mut self, symbol: &str) -> Self {
        self.currency_symbol = symbol.to_string();
        self
    }

    /// Palette color for series `index`, cycling through the scheme
    pub fn series_color(&self, index: usize) -> String {
        let palette = self.scheme.palette();
        palette[index % palette.len()].to_string()
    }

    /// The component's own color token, or the palette's first color
    pub fn accent(&self, override_color: Option<&str>) -> String {
        match override_color {
            Some(color) if !color.trim().is_empty() => color.to_string(),
            _ => self.series_color(0),
        }
    }

    pub fn format_value(&self, value: f64, format: ValueFormat, decimals: Option<u32>) -> String {
        let places = |default: u32| decimals.unwrap_or(default).min(MAX_DECIMALS) as usize;
        match format {
            ValueFormat::Integer => group_thousands(value, 0),
            ValueFormat::Number => group_thousands(value, places(2)),
            ValueFormat::Currency => format!("{} {}", self.currency_symbol, group_thousands(value, places(2))),
            ValueFormat::Percent => format!("{:.*}%", places(1), value),
            ValueFormat::Duration => format_minutes(value),
        }
    }
}

/// Upper bound on displayed decimal places
pub const MAX_DECIMALS: u32 = 10;

/// `1234567.891` with 2 decimals becomes `1,234,567.89`
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted.clone(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn format_minutes(minutes: f64) -> String {
    let total = minutes.round().max(0.0) as u64;
    let (hours, mins) = (total / 60, total % 60);
    if hours > 0 {
        format!("{}h {:02}min", hours, mins)
    } else {
        format!("{}min", mins)
    }
}
