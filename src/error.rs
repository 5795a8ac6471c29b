//! Error types for polycomp
//!
//! Clear error messages with actionable guidance: every variant that can reach
//! a user says what was wrong and, where possible, what to do about it.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// polycomp error types
#[derive(Error, Debug)]
pub enum Error {
    /// User or caller supplied a value outside the documented range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Categorical label not known to the fitted encoder
    #[error("Unknown {field} category '{label}'\nKnown categories: {known}")]
    UnknownCategory {
        /// Feature the label belongs to (e.g. `Polymer_Matrix`)
        field: String,
        /// Offending label
        label: String,
        /// Comma-separated list of accepted labels
        known: String,
    },

    /// Persisted artifact is missing, truncated or of the wrong kind
    #[error("Artifact error: {0}\nRe-run `polycomp train` to regenerate the model artifacts.")]
    Artifact(String),

    /// Artifact checksum mismatch (corruption)
    #[error("Artifact checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the artifact trailer
        expected: u32,
        /// Checksum computed over the artifact content
        actual: u32,
    },

    /// Configuration document could not be parsed or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model fitting failed
    #[error("Training error: {0}")]
    Training(String),

    /// Prediction failed (non-fatal; the predictor stays usable)
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Storage error (Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Payload (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the front-end can keep serving after this error.
    ///
    /// Artifact and configuration errors leave the predictor partially
    /// initialized and must abort startup.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Artifact(_) | Self::ChecksumMismatch { .. } | Self::Config(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
