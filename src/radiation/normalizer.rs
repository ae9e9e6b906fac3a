/// Unit normalizer
///
/// Reads an uploaded CSV, detects its radiation layout and produces
/// observations with UTC timestamps and radiation in W/m².
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::models::Observation;
use super::schema::{
    column_index, SchemaKind, DATE_COLUMN, STATION_CODE_COLUMN, STATION_NAME_COLUMN,
};
use crate::process_error::ProcessError;
use crate::utils::parse_timestamp;

#[instrument(skip(data), fields(bytes = data.len()))]
pub fn normalize(data: &[u8]) -> Result<Vec<Observation>, ProcessError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(data);
    let headers = reader.headers()?.clone();

    let schema = SchemaKind::detect(headers.iter());
    let radiation_column = schema.radiation_column().ok_or_else(|| {
        warn!("No recognized radiation column in headers: {:?}", headers);
        ProcessError::UnrecognizedSchema
    })?;
    debug!("Detected {:?} schema", schema);

    let date_idx = require_column(&headers, DATE_COLUMN)?;
    let code_idx = require_column(&headers, STATION_CODE_COLUMN)?;
    let name_idx = require_column(&headers, STATION_NAME_COLUMN)?;
    let radiation_idx = require_column(&headers, radiation_column)?;

    let mut observations = Vec::new();
    let mut blank_values = 0;
    // first name seen per code, including rows later skipped for blank values
    let mut station_names: HashMap<String, String> = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let raw_timestamp = record.get(date_idx).unwrap_or_default();
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| ProcessError::InvalidTimestamp {
                line,
                value: raw_timestamp.to_string(),
            })?;

        let station_code = record.get(code_idx).unwrap_or_default();
        let station_name = station_names
            .entry(station_code.to_string())
            .or_insert_with(|| record.get(name_idx).unwrap_or_default().to_string())
            .clone();

        let raw_value = record.get(radiation_idx).unwrap_or_default();
        if raw_value.is_empty() {
            debug!("Blank radiation value on line {}, skipping", line);
            blank_values += 1;
            continue;
        }

        let value: f64 = raw_value
            .parse()
            .map_err(|_| ProcessError::InvalidRadiation {
                line,
                value: raw_value.to_string(),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(ProcessError::OutOfRangeRadiation { line, value });
        }

        observations.push(Observation {
            timestamp,
            station_code: station_code.to_string(),
            station_name,
            radiation_wm2: schema.to_watts_per_m2(value),
        });
    }

    if blank_values > 0 {
        warn!("Skipped {} rows with blank radiation values", blank_values);
    }

    if observations.is_empty() {
        return Err(ProcessError::NoObservations);
    }

    info!(
        "Normalized {} observations ({:?} schema)",
        observations.len(),
        schema
    );

    Ok(observations)
}

fn require_column(headers: &StringRecord, name: &str) -> Result<usize, ProcessError> {
    column_index(headers, name).ok_or_else(|| ProcessError::MissingColumn(name.to_string()))
}
