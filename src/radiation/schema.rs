/// Upload column layouts
///
/// Stations export radiation either as an instantaneous flux in W/m² or as an
/// hourly sum in J/cm². The header row is inspected once to decide which.
use csv::StringRecord;

pub const DATE_COLUMN: &str = "date [UTC]";
pub const STATION_CODE_COLUMN: &str = "stationCode";
pub const STATION_NAME_COLUMN: &str = "name";
pub const WATTS_COLUMN: &str = "shortWaveRadiation [watts per square meter]";
pub const JOULES_COLUMN: &str = "globalRadiation60Min [joules per square centimeter]";

/// Date column name after renaming, accepted by the gap checker
pub const CANONICAL_DATE_COLUMN: &str = "date_utc";

/// J/cm² to J/m²
const SQUARE_CM_PER_SQUARE_M: f64 = 10_000.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    DirectWatts,
    HourlyJoules,
    Unrecognized,
}

impl SchemaKind {
    /// Classify a header row. A direct W/m² column wins when both are present.
    pub fn detect<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut kind = SchemaKind::Unrecognized;
        for header in headers {
            match clean_header(header) {
                WATTS_COLUMN => return SchemaKind::DirectWatts,
                JOULES_COLUMN => kind = SchemaKind::HourlyJoules,
                _ => {}
            }
        }
        kind
    }

    pub fn radiation_column(&self) -> Option<&'static str> {
        match self {
            SchemaKind::DirectWatts => Some(WATTS_COLUMN),
            SchemaKind::HourlyJoules => Some(JOULES_COLUMN),
            SchemaKind::Unrecognized => None,
        }
    }

    /// Convert a raw cell value into average power per square meter
    pub fn to_watts_per_m2(&self, value: f64) -> f64 {
        match self {
            SchemaKind::HourlyJoules => value * SQUARE_CM_PER_SQUARE_M / SECONDS_PER_HOUR,
            SchemaKind::DirectWatts | SchemaKind::Unrecognized => value,
        }
    }
}

/// Position of a named column, ignoring surrounding whitespace and a leading BOM
pub fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| clean_header(header) == name)
}

fn clean_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}
