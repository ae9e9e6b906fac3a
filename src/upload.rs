/// Multipart upload handling
///
/// Collects the `file`, `tool` and `tolerance` fields of an upload form and
/// validates them before any processing is attempted.
use axum::extract::Multipart;
use thiserror::Error;
use tracing::debug;

use crate::process_error::ProcessError;
use crate::services::Tool;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Only .csv files are accepted (got '{0}')")]
    NotCsv(String),

    #[error("Tolerance must be a whole number of hours (got '{0}')")]
    InvalidTolerance(String),

    #[error("Malformed upload: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct UploadForm {
    pub file_name: String,
    pub contents: Vec<u8>,
    pub tool: Option<String>,
    pub tolerance_hours: Option<u32>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, UploadError> {
        let mut file: Option<(Option<String>, Vec<u8>)> = None;
        let mut tool = None;
        let mut tolerance_hours = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::Malformed(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| UploadError::Malformed(e.body_text()))?;
                    file = Some((file_name, bytes.to_vec()));
                }
                "tool" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| UploadError::Malformed(e.body_text()))?;
                    tool = Some(value);
                }
                "tolerance" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| UploadError::Malformed(e.body_text()))?;
                    tolerance_hours = parse_tolerance(&value)?;
                }
                other => debug!("Ignoring unexpected form field '{}'", other),
            }
        }

        let (file_name, contents) = file.ok_or(UploadError::NoFilePart)?;
        let file_name = file_name.unwrap_or_default();
        validate_file_name(&file_name)?;

        debug!("Accepted upload '{}' ({} bytes)", file_name, contents.len());

        Ok(Self {
            file_name,
            contents,
            tool,
            tolerance_hours,
        })
    }

    /// Selected tool; interpolator when the field is absent or blank
    pub fn tool(&self) -> Result<Tool, ProcessError> {
        match self.tool.as_deref().map(str::trim) {
            None | Some("") => Ok(Tool::Interpolator),
            Some(value) => value.parse(),
        }
    }
}

pub fn validate_file_name(file_name: &str) -> Result<(), UploadError> {
    if file_name.trim().is_empty() {
        return Err(UploadError::NoSelectedFile);
    }
    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(UploadError::NotCsv(file_name.to_string()));
    }
    Ok(())
}

/// Blank means "use the default"
pub fn parse_tolerance(raw: &str) -> Result<Option<u32>, UploadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| UploadError::InvalidTolerance(trimmed.to_string()))
}
