// End-to-end tests for both tools through the service object
// Exercises CSV in -> CSV/sentences out without the HTTP layer

mod common;

use chrono::{DateTime, Utc};
use common::{two_station_hourly_csv, JOULES_HEADER, WATTS_HEADER};
use radiation_resampler::process_error::ProcessError;
use radiation_resampler::services::{RadiationService, Tool, ToolOutput};
use std::collections::BTreeMap;

/// Parse resampled output into station -> [(timestamp, value)]
fn parse_output(body: &[u8]) -> BTreeMap<String, Vec<(DateTime<Utc>, i64)>> {
    let mut reader = csv::Reader::from_reader(body);
    let mut stations: BTreeMap<String, Vec<(DateTime<Utc>, i64)>> = BTreeMap::new();
    for record in reader.records() {
        let record = record.unwrap();
        let timestamp = DateTime::parse_from_rfc3339(&record[0])
            .unwrap()
            .with_timezone(&Utc);
        let value: i64 = record[3].parse().unwrap();
        stations
            .entry(record[1].to_string())
            .or_default()
            .push((timestamp, value));
    }
    stations
}

#[test]
fn test_two_stations_yield_nine_rows_each() {
    let service = RadiationService::default();
    let csv = service.interpolate(two_station_hourly_csv().as_bytes()).unwrap();

    assert_eq!(csv.filename, "interpolated_weather_data.csv");
    assert_eq!(csv.station_count, 2);
    assert_eq!(csv.row_count, 18);

    let stations = parse_output(&csv.body);
    assert_eq!(stations.len(), 2);
    for (code, rows) in &stations {
        assert_eq!(rows.len(), 9, "station {code} should have 9 grid points");
        assert!(
            rows.windows(2).all(|w| w[0].0 < w[1].0),
            "station {code} timestamps must strictly increase"
        );
    }

    let de_bilt: Vec<i64> = stations["0-20000-0-06260"].iter().map(|r| r.1).collect();
    assert_eq!(de_bilt, vec![0, 30, 60, 90, 120, 150, 180, 210, 240]);

    let vlissingen: Vec<i64> = stations["0-20000-0-06310"].iter().map(|r| r.1).collect();
    assert_eq!(vlissingen, vec![10, 20, 30, 40, 50, 45, 40, 35, 30]);
}

#[test]
fn test_output_header_and_timestamp_format() {
    let service = RadiationService::default();
    let csv = service.interpolate(two_station_hourly_csv().as_bytes()).unwrap();
    let text = String::from_utf8(csv.body).unwrap();
    let mut lines = text.lines();

    assert_eq!(lines.next().unwrap(), WATTS_HEADER);
    assert_eq!(
        lines.next().unwrap(),
        "2024-06-01T00:00:00Z,0-20000-0-06260,De Bilt,0"
    );
    assert_eq!(
        lines.next().unwrap(),
        "2024-06-01T00:15:00Z,0-20000-0-06260,De Bilt,30"
    );
}

#[test]
fn test_station_rows_are_contiguous() {
    // Interleaved input rows still come out grouped per station
    let csv = format!(
        "{WATTS_HEADER}\n\
         2024-06-01T00:00:00Z,B,Bravo,0\n\
         2024-06-01T00:00:00Z,A,Alpha,0\n\
         2024-06-01T00:30:00Z,B,Bravo,60\n\
         2024-06-01T00:30:00Z,A,Alpha,60\n"
    );
    let output = RadiationService::default().interpolate(csv.as_bytes()).unwrap();
    let text = String::from_utf8(output.body).unwrap();
    let codes: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(codes, vec!["A", "A", "A", "B", "B", "B"]);
}

#[test]
fn test_joules_upload_is_converted_before_resampling() {
    let csv = format!(
        "{JOULES_HEADER}\n\
         2024-06-01T10:00:00Z,06260,De Bilt,3.6\n\
         2024-06-01T11:00:00Z,06260,De Bilt,36\n"
    );
    let output = RadiationService::default().interpolate(csv.as_bytes()).unwrap();
    let values: Vec<i64> = parse_output(&output.body)["06260"].iter().map(|r| r.1).collect();

    // 10 W/m² -> 100 W/m² over one hour
    assert_eq!(values, vec![10, 32, 55, 78, 100]);
}

#[test]
fn test_unrecognized_schema_aborts_whole_request() {
    let csv = "date [UTC],stationCode,name,rain\n2024-06-01T10:00:00Z,06260,De Bilt,3\n";
    let result = RadiationService::default().run(Tool::Interpolator, csv.as_bytes(), None);
    match result {
        Err(ProcessError::UnrecognizedSchema) => {}
        other => panic!("Expected UnrecognizedSchema, got {other:?}"),
    }
}

#[test]
fn test_gap_checker_on_raw_upload() {
    let csv = format!(
        "{WATTS_HEADER}\n\
         2024-06-01T00:00:00Z,A,Alpha,0\n\
         2024-06-01T08:00:00Z,A,Alpha,10\n\
         2024-06-01T00:00:00Z,B,Bravo,0\n\
         2024-06-01T04:00:00Z,B,Bravo,0\n\
         2024-06-01T00:00:00Z,C,Charlie,0\n"
    );
    let output = RadiationService::default()
        .run(Tool::GapChecker, csv.as_bytes(), None)
        .unwrap();

    let ToolOutput::Gaps(findings) = output else {
        panic!("Expected gap findings");
    };
    let sentences: Vec<String> = findings.iter().map(ToString::to_string).collect();
    assert_eq!(
        sentences,
        vec![
            "Station A: gap from 2024-06-01 00:00 to 2024-06-01 08:00 (8.0 hours)".to_string(),
            "Station B: no significant gaps (tolerance 6 hours)".to_string(),
        ]
    );
}

#[test]
fn test_gap_checker_does_not_need_radiation_column() {
    let csv = "date [UTC],stationCode\n2024-06-01T00:00:00Z,A\n2024-06-02T00:00:00Z,A\n";
    let findings = RadiationService::default()
        .check_gaps(csv.as_bytes(), Some(12))
        .unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].as_gap().unwrap().duration_hours, 24.0);
}

#[test]
fn test_gap_checker_rejects_unparseable_timestamp() {
    let csv = "date [UTC],stationCode\n2024-06-01T00:00:00Z,A\nlater,A\n";
    let err = RadiationService::default()
        .check_gaps(csv.as_bytes(), None)
        .unwrap_err();
    assert!(err.user_message().starts_with("Error processing file:"));
    assert!(err.user_message().contains("later"));
}
