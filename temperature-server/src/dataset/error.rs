//! Dataset error types.
//!
//! Data-shape problems inside the file (bad numbers, blank years) never
//! surface here: they are coerced to missing readings at load time.

use std::path::PathBuf;

/// Errors from loading or querying the temperature dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset file does not exist
    #[error("dataset not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The dataset file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the file
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required header column is absent
    #[error("{} has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// Caller-supplied query parameters are unusable
    #[error("{0}")]
    InvalidRequest(String),

    /// Some requested stations are not in the dataset
    #[error("unknown stations: {}", .0.join(", "))]
    UnknownStations(Vec<String>),
}

impl DatasetError {
    /// Classify an I/O failure on `path`, separating "absent" from other errors.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetError::NotFound { path }
        } else {
            DatasetError::Io { path, source }
        }
    }
}
