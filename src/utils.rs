/// Shared timestamp and rounding helpers for the radiation tools
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Output format for resampled grid timestamps
pub const GRID_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Minute-precision format used in gap sentences
pub const MINUTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp cell into an absolute UTC instant
///
/// Accepts RFC 3339 values (with `Z` or a numeric offset, converted to UTC),
/// naive date-times with a `T` or space separator (interpreted as UTC), and
/// bare dates (midnight UTC).
///
/// # Examples
///
/// ```
/// use radiation_resampler::utils::parse_timestamp;
///
/// let ts = parse_timestamp("2024-06-01T12:00:00+02:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2024-06-01T10:00:00+00:00");
/// assert!(parse_timestamp("2024-06-01 10:15").is_some());
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // A trailing Z on an otherwise naive value (e.g. missing seconds)
    let naive = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .unwrap_or(trimmed);

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn format_grid_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(GRID_TIMESTAMP_FORMAT).to_string()
}

pub fn format_minute_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(MINUTE_TIMESTAMP_FORMAT).to_string()
}

/// Round to one decimal place, half away from zero
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
