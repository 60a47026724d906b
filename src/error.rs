//! Error types for encoding and inference.
//!
//! Failures fall into two tiers. Load-tier errors mean there is no model to
//! predict with until an operator fixes the artifact; request-tier errors mean
//! one prediction failed and the next request may well succeed. [`Error::stage`]
//! exposes the tier so callers can route the two kinds of message differently.

use thiserror::Error;

/// Error type for all encoder, artifact, and gateway operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A categorical field received a label outside its encoding table.
    #[error("invalid label {label:?} for {field}: expected one of {expected}")]
    InvalidLabel {
        field: &'static str,
        label: String,
        expected: String,
    },

    /// A numeric field fell outside its permitted interval.
    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The model artifact does not exist at the configured path.
    #[error("model artifact not found at '{path}': place the model file there or pass its location explicitly")]
    ArtifactNotFound { path: String },

    /// The model artifact exists but cannot be decoded.
    #[error("model artifact at '{path}' is corrupt: {reason}")]
    ArtifactCorrupt { path: String, reason: String },

    /// An artifact could not be serialized or written out.
    #[error("artifact write failed: {reason}")]
    ArtifactWrite { reason: String },

    /// A loaded model rejected a scoring request.
    #[error("prediction failed: {reason}")]
    PredictionError { reason: String },
}

/// Which tier of the pipeline an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Artifact loading failed; there is nothing to predict with.
    Load,
    /// One request failed; the loaded model (if any) is still usable.
    Request,
}

impl Error {
    /// Tier of the failure, for caller-side message routing.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Error::ArtifactNotFound { .. }
            | Error::ArtifactCorrupt { .. }
            | Error::ArtifactWrite { .. } => Stage::Load,
            Error::InvalidLabel { .. }
            | Error::OutOfRange { .. }
            | Error::PredictionError { .. } => Stage::Request,
        }
    }
}

/// Result type for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
