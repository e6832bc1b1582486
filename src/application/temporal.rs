// Timestamp parsing, truncation and date windows
use crate::domain::dimension::Granularity;
use crate::domain::query::{DatePreset, DateRange};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};
use serde_json::Value;

/// Parse a row cell as an instant.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`,
/// `DD/MM/YYYY`, and epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    parse_date(s).and_then(|date| date.and_hms_opt(0, 0, 0)).map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

/// Start of the bucket containing `ts`
pub fn truncate(ts: DateTime<Utc>, granularity: Granularity) -> Option<DateTime<Utc>> {
    let date = ts.date_naive();
    let start = match granularity {
        Granularity::Hour => date.and_hms_opt(ts.hour(), 0, 0)?,
        Granularity::Day => date.and_hms_opt(0, 0, 0)?,
        Granularity::Week => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            monday.and_hms_opt(0, 0, 0)?
        }
        Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.and_hms_opt(0, 0, 0)?,
        Granularity::Quarter => {
            let month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), month, 1)?.and_hms_opt(0, 0, 0)?
        }
        Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0)?,
    };
    Some(Utc.from_utc_datetime(&start))
}

/// Display label of a bucket start
pub fn bucket_label(start: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Hour => start.format("%d/%m %H:00").to_string(),
        Granularity::Day => start.format("%d/%m/%Y").to_string(),
        Granularity::Week => {
            let week = start.iso_week();
            format!("Sem {:02}/{}", week.week(), week.year())
        }
        Granularity::Month => start.format("%m/%Y").to_string(),
        Granularity::Quarter => format!("T{}/{}", start.month0() / 3 + 1, start.year()),
        Granularity::Year => start.format("%Y").to_string(),
    }
}

pub fn to_timestamp_string(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Inclusive instant window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// The window of equal length ending just before this one, `None` past the supported dates
    pub fn previous(&self) -> Option<TimeWindow> {
        let length = self.end.signed_duration_since(self.start);
        let end = self.start.checked_sub_signed(Duration::milliseconds(1))?;
        let start = end.checked_sub_signed(length)?;
        Some(TimeWindow { start, end })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    MissingBound(&'static str),
    Unparseable(String),
    Reversed,
    OutOfRange,
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::MissingBound(bound) => write!(f, "custom range needs a {} date", bound),
            WindowError::Unparseable(raw) => write!(f, "'{}' is not a date", raw),
            WindowError::Reversed => write!(f, "range starts after it ends"),
            WindowError::OutOfRange => write!(f, "range falls outside supported dates"),
        }
    }
}

/// Resolve a preset or custom range against `now`.
///
/// A date-only custom end covers that whole day.
pub fn resolve_window(range: &DateRange, now: DateTime<Utc>) -> Result<TimeWindow, WindowError> {
    let start = match range.preset {
        DatePreset::Last7Days => now - Duration::days(7),
        DatePreset::Last30Days => now - Duration::days(30),
        DatePreset::Last3Months => now
            .checked_sub_months(Months::new(3))
            .ok_or(WindowError::OutOfRange)?,
        DatePreset::LastYear => now
            .checked_sub_months(Months::new(12))
            .ok_or(WindowError::OutOfRange)?,
        DatePreset::Custom => return resolve_custom(range),
    };
    Ok(TimeWindow { start, end: now })
}

fn resolve_custom(range: &DateRange) -> Result<TimeWindow, WindowError> {
    let raw_start = range.start.as_deref().ok_or(WindowError::MissingBound("start"))?;
    let raw_end = range.end.as_deref().ok_or(WindowError::MissingBound("end"))?;

    let start = parse_timestamp_str(raw_start).ok_or_else(|| WindowError::Unparseable(raw_start.to_string()))?;
    let end = match parse_date(raw_end.trim()) {
        Some(date) => {
            let next_day = date.succ_opt().ok_or(WindowError::OutOfRange)?;
            let midnight = next_day.and_hms_opt(0, 0, 0).ok_or(WindowError::OutOfRange)?;
            Utc.from_utc_datetime(&midnight)
                .checked_sub_signed(Duration::milliseconds(1))
                .ok_or(WindowError::OutOfRange)?
        }
        None => parse_timestamp_str(raw_end).ok_or_else(|| WindowError::Unparseable(raw_end.to_string()))?,
    };

    if start > end {
        return Err(WindowError::Reversed);
    }
    Ok(TimeWindow { start, end })
}
