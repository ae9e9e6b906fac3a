#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("CSV must contain a radiation column.")]
    UnrecognizedSchema,
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Failed to parse timestamp '{value}' on line {line}")]
    InvalidTimestamp { line: u64, value: String },
    #[error("Radiation value '{value}' on line {line} is not a number")]
    InvalidRadiation { line: u64, value: String },
    #[error("Radiation value {value} on line {line} must be finite and non-negative")]
    OutOfRangeRadiation { line: u64, value: f64 },
    #[error("Resampling would produce {points} grid points by station '{station_code}' (limit {limit})")]
    GridTooLarge {
        station_code: String,
        points: u64,
        limit: usize,
    },
    #[error("File contains no observations")]
    NoObservations,
    #[error("File is not valid UTF-8 text")]
    InvalidEncoding,
    #[error("Invalid tool '{0}': expected 'interpolator' or 'gap_checker'")]
    InvalidTool(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Processing task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl ProcessError {
    /// Message shown to the person who submitted the file
    pub fn user_message(&self) -> String {
        match self {
            ProcessError::UnrecognizedSchema | ProcessError::InvalidTool(_) => self.to_string(),
            other => format!("Error processing file: {other}"),
        }
    }

    /// Input-validation failures as opposed to failures while transforming the data
    pub fn is_validation(&self) -> bool {
        matches!(self, ProcessError::InvalidTool(_))
    }

    /// Failures of the service itself rather than of the submitted file
    pub fn is_internal(&self) -> bool {
        matches!(self, ProcessError::TaskFailed(_))
    }
}
