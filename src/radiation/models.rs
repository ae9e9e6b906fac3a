use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::utils::format_minute_timestamp;

/// One normalized input row, radiation already in W/m²
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub station_code: String,
    pub station_name: String,
    pub radiation_wm2: f64,
}

/// A resampled value on the 15-minute grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPoint {
    pub timestamp: DateTime<Utc>,
    pub station_code: String,
    pub station_name: String,
    pub radiation_wm2: i64,
}

/// Date and station columns only; all the gap checker needs
#[derive(Debug, Clone, PartialEq)]
pub struct StationTimestamp {
    pub station_code: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GapRecord {
    pub station_code: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Rounded to one decimal
    pub duration_hours: f64,
}

/// Outcome of checking one station: each gap, or a single clean marker
#[derive(Debug, Clone, PartialEq)]
pub enum GapFinding {
    Gap(GapRecord),
    Clean {
        station_code: String,
        tolerance_hours: u32,
    },
}

impl GapFinding {
    pub fn station_code(&self) -> &str {
        match self {
            GapFinding::Gap(record) => &record.station_code,
            GapFinding::Clean { station_code, .. } => station_code,
        }
    }

    pub fn as_gap(&self) -> Option<&GapRecord> {
        match self {
            GapFinding::Gap(record) => Some(record),
            GapFinding::Clean { .. } => None,
        }
    }
}

impl fmt::Display for GapFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapFinding::Gap(record) => write!(
                f,
                "Station {}: gap from {} to {} ({:.1} hours)",
                record.station_code,
                format_minute_timestamp(&record.start),
                format_minute_timestamp(&record.end),
                record.duration_hours
            ),
            GapFinding::Clean {
                station_code,
                tolerance_hours,
            } => write!(
                f,
                "Station {station_code}: no significant gaps (tolerance {tolerance_hours} hours)"
            ),
        }
    }
}
