// Solar radiation transformations
//
// Everything here is a pure, request-scoped function over an in-memory table:
// - schema: detects which of the two known upload layouts is present
// - normalizer: renames columns and converts hourly J/cm² sums to W/m²
// - resampler: re-grids each station onto 15-minute boundaries
// - gap_checker: reports intervals between observations above a tolerance

pub mod gap_checker;
pub mod models;
pub mod normalizer;
pub mod resampler;
pub mod schema;

pub use gap_checker::{check_gaps, read_timestamps, DEFAULT_TOLERANCE_HOURS};
pub use models::{GapFinding, GapRecord, GridPoint, Observation, StationTimestamp};
pub use normalizer::normalize;
pub use resampler::{resample, write_csv, DEFAULT_MAX_GRID_POINTS, GRID_INTERVAL_MINUTES};
pub use schema::SchemaKind;
