/// Resampler/interpolator
///
/// Re-grids each station onto 15-minute boundaries between its first and last
/// observation and fills grid points by linear interpolation between the two
/// observations bracketing them. Nothing is extrapolated past either end.
///
/// Values are rounded to whole W/m², ties to even.
use chrono::{DateTime, Duration, Utc};
use csv::{Terminator, WriterBuilder};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use super::models::{GridPoint, Observation};
use super::schema::{DATE_COLUMN, STATION_CODE_COLUMN, STATION_NAME_COLUMN, WATTS_COLUMN};
use crate::process_error::ProcessError;
use crate::utils::format_grid_timestamp;

pub const GRID_INTERVAL_MINUTES: i64 = 15;

/// Default ceiling on grid points per request
pub const DEFAULT_MAX_GRID_POINTS: usize = 1_000_000;

/// Suggested filename for the resampled download
pub const OUTPUT_FILENAME: &str = "interpolated_weather_data.csv";

struct StationSeries<'a> {
    /// First name seen for the code in file order
    name: &'a str,
    observations: Vec<&'a Observation>,
}

/// Resample every station; stations come out in ascending code order, each
/// station's grid contiguous
///
/// Fails with `ProcessError::GridTooLarge` before allocating anything when the
/// combined grid would exceed `max_points`.
#[instrument(skip(observations), fields(observations = observations.len()))]
pub fn resample(
    observations: &[Observation],
    max_points: usize,
) -> Result<Vec<GridPoint>, ProcessError> {
    let mut stations: BTreeMap<&str, StationSeries> = BTreeMap::new();
    for obs in observations {
        stations
            .entry(obs.station_code.as_str())
            .or_insert_with(|| StationSeries {
                name: obs.station_name.as_str(),
                observations: Vec::new(),
            })
            .observations
            .push(obs);
    }

    let mut total: u64 = 0;
    for (code, series) in stations.iter_mut() {
        // stable, so the first row of a duplicated timestamp survives dedup
        series.observations.sort_by_key(|obs| obs.timestamp);
        series.observations.dedup_by_key(|obs| obs.timestamp);

        let count = grid_len(&series.observations);
        total = total.saturating_add(count);
        if total > max_points as u64 {
            warn!(
                "Station {} pushes the grid to {} points (limit {})",
                code, total, max_points
            );
            return Err(ProcessError::GridTooLarge {
                station_code: code.to_string(),
                points: total,
                limit: max_points,
            });
        }
    }

    let mut points = Vec::with_capacity(total as usize);
    for (code, series) in &stations {
        let grid = resample_station(code, series.name, &series.observations);
        if grid.is_empty() {
            debug!(
                "Station {}: {} observations never cross a grid boundary, no points",
                code,
                series.observations.len()
            );
        } else {
            debug!(
                "Station {}: {} observations -> {} grid points",
                code,
                series.observations.len(),
                grid.len()
            );
        }
        points.extend(grid);
    }

    info!("Resampled to {} grid points", points.len());
    Ok(points)
}

/// Number of points `resample_station` will emit for a sorted, deduplicated series
fn grid_len(series: &[&Observation]) -> u64 {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return 0,
    };

    let start = ceil_to_grid(first.timestamp);
    let end = floor_to_grid(last.timestamp);
    if start > end {
        return u64::from(series.len() == 1);
    }

    let intervals = (end - start).num_minutes() / GRID_INTERVAL_MINUTES;
    u64::try_from(intervals).unwrap_or(0) + 1
}

/// `series` must be sorted by timestamp with no duplicate timestamps
fn resample_station(code: &str, name: &str, series: &[&Observation]) -> Vec<GridPoint> {
    let point = |timestamp: DateTime<Utc>, value: f64| GridPoint {
        timestamp,
        station_code: code.to_string(),
        station_name: name.to_string(),
        radiation_wm2: round_radiation(value),
    };

    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };

    let start = ceil_to_grid(first.timestamp);
    let end = floor_to_grid(last.timestamp);
    let step = Duration::minutes(GRID_INTERVAL_MINUTES);

    if start > end {
        if series.len() == 1 {
            return vec![point(floor_to_grid(first.timestamp), first.radiation_wm2)];
        }
        // several observations inside one interval: nothing to interpolate onto
        return Vec::new();
    }

    let mut grid = Vec::new();
    let mut upper = 0;
    let mut t = start;
    while t <= end {
        // first observation at or after t; exists because last >= end >= t
        while series[upper].timestamp < t {
            upper += 1;
        }

        let at = series[upper];
        let value = if at.timestamp == t || upper == 0 {
            at.radiation_wm2
        } else {
            interpolate(series[upper - 1], at, t)
        };

        grid.push(point(t, value));
        t += step;
    }

    grid
}

fn interpolate(lower: &Observation, upper: &Observation, at: DateTime<Utc>) -> f64 {
    let span = (upper.timestamp - lower.timestamp).num_milliseconds() as f64;
    let offset = (at - lower.timestamp).num_milliseconds() as f64;
    lower.radiation_wm2 + (upper.radiation_wm2 - lower.radiation_wm2) * offset / span
}

fn round_radiation(value: f64) -> i64 {
    value.round_ties_even() as i64
}

pub(crate) fn floor_to_grid(ts: DateTime<Utc>) -> DateTime<Utc> {
    let step_seconds = GRID_INTERVAL_MINUTES * 60;
    let excess = ts.timestamp().rem_euclid(step_seconds);
    ts - Duration::seconds(excess) - Duration::nanoseconds(i64::from(ts.timestamp_subsec_nanos()))
}

pub(crate) fn ceil_to_grid(ts: DateTime<Utc>) -> DateTime<Utc> {
    let floor = floor_to_grid(ts);
    if floor == ts {
        ts
    } else {
        floor + Duration::minutes(GRID_INTERVAL_MINUTES)
    }
}

/// Render grid points as CSV with the upload's human-readable column names
pub fn write_csv(points: &[GridPoint]) -> Result<Vec<u8>, ProcessError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record([
        DATE_COLUMN,
        STATION_CODE_COLUMN,
        STATION_NAME_COLUMN,
        WATTS_COLUMN,
    ])?;

    for point in points {
        writer.write_record([
            format_grid_timestamp(&point.timestamp),
            point.station_code.clone(),
            point.station_name.clone(),
            point.radiation_wm2.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ProcessError::Csv(e.into_error().into()))
}
