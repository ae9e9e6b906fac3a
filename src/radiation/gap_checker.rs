/// Gap checker
///
/// Flags intervals between consecutive observations of one station that are
/// longer than a tolerance. Only the date and station columns are read, so the
/// radiation layout does not matter here.
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use super::models::{GapFinding, GapRecord, StationTimestamp};
use super::schema::{column_index, CANONICAL_DATE_COLUMN, DATE_COLUMN, STATION_CODE_COLUMN};
use crate::process_error::ProcessError;
use crate::utils::{parse_timestamp, round_one_decimal};

pub const DEFAULT_TOLERANCE_HOURS: u32 = 6;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Read the date and station columns from an upload
///
/// The date column may carry either its upload name or the canonical
/// `date_utc`; all other columns are ignored.
#[instrument(skip(data), fields(bytes = data.len()))]
pub fn read_timestamps(data: &[u8]) -> Result<Vec<StationTimestamp>, ProcessError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(data);
    let headers = reader.headers()?.clone();

    let date_idx = column_index(&headers, DATE_COLUMN)
        .or_else(|| column_index(&headers, CANONICAL_DATE_COLUMN))
        .ok_or_else(|| ProcessError::MissingColumn(DATE_COLUMN.to_string()))?;
    let code_idx = column_index(&headers, STATION_CODE_COLUMN)
        .ok_or_else(|| ProcessError::MissingColumn(STATION_CODE_COLUMN.to_string()))?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let raw_timestamp = record.get(date_idx).unwrap_or_default();
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| ProcessError::InvalidTimestamp {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                value: raw_timestamp.to_string(),
            })?;

        rows.push(StationTimestamp {
            station_code: record.get(code_idx).unwrap_or_default().to_string(),
            timestamp,
        });
    }

    debug!("Read {} station timestamps", rows.len());
    Ok(rows)
}

/// Check every station for gaps strictly longer than `tolerance_hours`
///
/// Stations are reported in ascending code order, gaps chronologically. A
/// station with no gaps gets one `GapFinding::Clean`; a station with fewer
/// than two timestamps is not reported at all.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn check_gaps(rows: &[StationTimestamp], tolerance_hours: u32) -> Vec<GapFinding> {
    let mut stations: BTreeMap<&str, Vec<DateTime<Utc>>> = BTreeMap::new();
    for row in rows {
        stations
            .entry(row.station_code.as_str())
            .or_default()
            .push(row.timestamp);
    }

    let tolerance = f64::from(tolerance_hours);
    let mut findings = Vec::new();

    for (code, mut timestamps) in stations {
        if timestamps.len() < 2 {
            debug!("Station {} has fewer than two observations, not checked", code);
            continue;
        }
        timestamps.sort_unstable();

        let gaps_before = findings.len();
        for pair in timestamps.windows(2) {
            let hours = (pair[1] - pair[0]).num_milliseconds() as f64 / MILLIS_PER_HOUR;
            if hours > tolerance {
                findings.push(GapFinding::Gap(GapRecord {
                    station_code: code.to_string(),
                    start: pair[0],
                    end: pair[1],
                    duration_hours: round_one_decimal(hours),
                }));
            }
        }

        let gap_count = findings.len() - gaps_before;
        if gap_count == 0 {
            findings.push(GapFinding::Clean {
                station_code: code.to_string(),
                tolerance_hours,
            });
        } else {
            info!("Station {}: {} gaps above {} hours", code, gap_count, tolerance_hours);
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(code: &str, day: u32, hour: u32) -> StationTimestamp {
        StationTimestamp {
            station_code: code.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_eight_hour_gap_is_reported() {
        let findings = check_gaps(&[row("A", 1, 0), row("A", 1, 8)], 6);

        assert_eq!(findings.len(), 1);
        let gap = findings[0].as_gap().expect("expected a gap");
        assert_eq!(gap.duration_hours, 8.0);
        assert_eq!(gap.start, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(gap.end, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_short_interval_yields_clean_marker() {
        let findings = check_gaps(&[row("A", 1, 0), row("A", 1, 4)], 6);

        assert_eq!(
            findings,
            vec![GapFinding::Clean {
                station_code: "A".to_string(),
                tolerance_hours: 6
            }]
        );
    }

    #[test]
    fn test_gap_equal_to_tolerance_is_not_reported() {
        let findings = check_gaps(&[row("A", 1, 0), row("A", 1, 6)], 6);
        assert!(findings[0].as_gap().is_none());
    }

    #[test]
    fn test_no_cross_station_comparison() {
        // A at 00:00, B at 12:00: twelve hours apart but different stations
        let findings = check_gaps(
            &[row("A", 1, 0), row("B", 1, 12), row("A", 1, 1), row("B", 1, 13)],
            6,
        );

        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.as_gap().is_none()));
        assert_eq!(findings[0].station_code(), "A");
        assert_eq!(findings[1].station_code(), "B");
    }

    #[test]
    fn test_single_observation_station_is_skipped() {
        let findings = check_gaps(&[row("A", 1, 0), row("B", 1, 0), row("B", 2, 0)], 6);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].station_code(), "B");
        assert_eq!(findings[0].as_gap().unwrap().duration_hours, 24.0);
    }

    #[test]
    fn test_gaps_are_chronological_regardless_of_input_order() {
        let findings = check_gaps(&[row("A", 3, 0), row("A", 1, 0), row("A", 2, 0)], 6);

        let starts: Vec<_> = findings.iter().filter_map(|f| f.as_gap()).map(|g| g.start).collect();
        assert_eq!(
            starts,
            vec![
                Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_duration_rounded_to_one_decimal() {
        let rows = vec![
            row("A", 1, 0),
            StationTimestamp {
                station_code: "A".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 7, 20, 0).unwrap(),
            },
        ];
        let findings = check_gaps(&rows, 6);
        assert_eq!(findings[0].as_gap().unwrap().duration_hours, 7.3);
    }

    #[test]
    fn test_read_timestamps_ignores_radiation_column() {
        let csv = "date [UTC],stationCode,name\n2024-06-01T00:00:00Z,A,Alpha\n2024-06-01 08:00,A,Alpha\n";
        let rows = read_timestamps(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].timestamp, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_read_timestamps_accepts_canonical_date_column() {
        let csv = "date_utc,stationCode\n2024-06-01T00:00:00Z,A\n";
        assert_eq!(read_timestamps(csv.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_read_timestamps_missing_station_column() {
        let csv = "date [UTC],name\n2024-06-01T00:00:00Z,Alpha\n";
        assert!(matches!(
            read_timestamps(csv.as_bytes()),
            Err(ProcessError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_read_timestamps_bad_timestamp() {
        let csv = "date [UTC],stationCode\nnope,A\n";
        assert!(matches!(
            read_timestamps(csv.as_bytes()),
            Err(ProcessError::InvalidTimestamp { line: 2, .. })
        ));
    }
}
