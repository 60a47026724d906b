//! Error types for prono-cli.

use std::process::ExitCode;
use thiserror::Error;

use pronosticar::Error as CoreError;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Model artifact missing
    #[error("{0}")]
    ArtifactNotFound(String),

    /// Artifact exists but cannot be decoded
    #[error("{0}")]
    ArtifactCorrupt(String),

    /// Input rejected before scoring
    #[error("{0}")]
    BadRequest(String),

    /// Scoring failed
    #[error("{0}")]
    Prediction(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::BadRequest(_) => ExitCode::from(2),
            Self::ArtifactNotFound(_) => ExitCode::from(3),
            Self::ArtifactCorrupt(_) => ExitCode::from(4),
            Self::ValidationFailed(_) => ExitCode::from(5),
            Self::Io(_) => ExitCode::from(7),
            Self::Prediction(_) => ExitCode::from(8),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        match &e {
            CoreError::ArtifactNotFound { .. } => Self::ArtifactNotFound(e.to_string()),
            CoreError::ArtifactCorrupt { .. } | CoreError::ArtifactWrite { .. } => {
                Self::ArtifactCorrupt(e.to_string())
            }
            CoreError::InvalidLabel { .. } | CoreError::OutOfRange { .. } => {
                Self::BadRequest(e.to_string())
            }
            CoreError::PredictionError { .. } => Self::Prediction(e.to_string()),
        }
    }
}
