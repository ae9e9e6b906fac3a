use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::process_error::ProcessError;
use crate::radiation::resampler::OUTPUT_FILENAME;
use crate::radiation::{self, GapFinding};

/// The two behaviors a caller can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Interpolator,
    GapChecker,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Interpolator => "interpolator",
            Tool::GapChecker => "gap_checker",
        }
    }
}

impl FromStr for Tool {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "interpolator" => Ok(Tool::Interpolator),
            "gap_checker" => Ok(Tool::GapChecker),
            other => Err(ProcessError::InvalidTool(other.to_string())),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resampled output ready to hand back as a download
#[derive(Debug, Clone)]
pub struct ResampledCsv {
    pub filename: &'static str,
    pub station_count: usize,
    pub row_count: usize,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum ToolOutput {
    Resampled(ResampledCsv),
    Gaps(Vec<GapFinding>),
}

/// Stateless entry point for both tools
///
/// Built once at startup; holds only configuration. Every call works on its
/// own copy of the uploaded data.
#[derive(Debug, Clone)]
pub struct RadiationService {
    default_tolerance_hours: u32,
    max_grid_points: usize,
}

impl Default for RadiationService {
    fn default() -> Self {
        Self::new(radiation::DEFAULT_TOLERANCE_HOURS)
    }
}

impl RadiationService {
    pub fn new(default_tolerance_hours: u32) -> Self {
        Self {
            default_tolerance_hours,
            max_grid_points: radiation::DEFAULT_MAX_GRID_POINTS,
        }
    }

    /// Cap on resampled rows per request
    pub fn with_max_grid_points(mut self, max_grid_points: usize) -> Self {
        self.max_grid_points = max_grid_points;
        self
    }

    pub fn default_tolerance_hours(&self) -> u32 {
        self.default_tolerance_hours
    }

    pub fn max_grid_points(&self) -> usize {
        self.max_grid_points
    }

    /// Normalize units, then resample every station onto the 15-minute grid
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub fn interpolate(&self, data: &[u8]) -> Result<ResampledCsv, ProcessError> {
        ensure_utf8(data)?;

        let observations = radiation::normalize(data)?;
        let points = radiation::resample(&observations, self.max_grid_points)?;
        let body = radiation::write_csv(&points)?;

        let mut station_count = 0;
        let mut previous: Option<&str> = None;
        for point in &points {
            if previous != Some(point.station_code.as_str()) {
                station_count += 1;
                previous = Some(point.station_code.as_str());
            }
        }

        info!(
            "Interpolated {} observations into {} rows across {} stations",
            observations.len(),
            points.len(),
            station_count
        );

        Ok(ResampledCsv {
            filename: OUTPUT_FILENAME,
            station_count,
            row_count: points.len(),
            body,
        })
    }

    /// Report gaps above `tolerance_hours` (or the configured default)
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub fn check_gaps(
        &self,
        data: &[u8],
        tolerance_hours: Option<u32>,
    ) -> Result<Vec<GapFinding>, ProcessError> {
        ensure_utf8(data)?;

        let tolerance = tolerance_hours.unwrap_or(self.default_tolerance_hours);
        debug!("Checking gaps with tolerance {} hours", tolerance);

        let rows = radiation::read_timestamps(data)?;
        let findings = radiation::check_gaps(&rows, tolerance);

        info!(
            "Gap check produced {} findings ({} gaps)",
            findings.len(),
            findings.iter().filter(|f| f.as_gap().is_some()).count()
        );

        Ok(findings)
    }

    pub fn run(
        &self,
        tool: Tool,
        data: &[u8],
        tolerance_hours: Option<u32>,
    ) -> Result<ToolOutput, ProcessError> {
        match tool {
            Tool::Interpolator => self.interpolate(data).map(ToolOutput::Resampled),
            Tool::GapChecker => self.check_gaps(data, tolerance_hours).map(ToolOutput::Gaps),
        }
    }
}

fn ensure_utf8(data: &[u8]) -> Result<(), ProcessError> {
    std::str::from_utf8(data)
        .map(|_| ())
        .map_err(|_| ProcessError::InvalidEncoding)
}
