use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the search backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Search API request with error code '{0}'")]
    Status(u16),

    #[error("No JSON object could be decoded from Search API")]
    Decode,

    #[error("Search API request failed: {0}")]
    Transport(String),

    #[error("Search API returned unexpected data: {0}")]
    UnexpectedData(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Errors surfaced by report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Collection, journal set or report combination missing from configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("data file error for {path}: {message}")]
    DataFile { path: PathBuf, message: String },

    #[error("failed to write report {path}: {message}")]
    Output { path: PathBuf, message: String },
}

impl ReportError {
    pub fn unknown_collection(collection: &str) -> Self {
        Self::Configuration(format!(
            "Unable to find journals for collection: {}",
            collection
        ))
    }

    pub fn output(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Output {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn data_file(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::DataFile {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
