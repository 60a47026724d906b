//! Dense linear scorer.

use serde_json::Value as JsonValue;

use crate::artifact::ArtifactWriter;
use crate::error::Result;
use crate::features::{FEATURE_COLUMNS, TARGET_COLUMN};
use crate::model::{Scorer, META_FEATURE_NAMES, META_MODEL, META_N_FEATURES, META_TARGET, MODEL_LINEAR};

/// Linear model: prediction = coefficients · row + intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScorer {
    coefficients: Vec<f32>,
    intercept: f32,
}

impl LinearScorer {
    /// Builds a scorer from fitted weights. One coefficient per input
    /// column, in the model's column order.
    #[must_use]
    pub fn new(coefficients: Vec<f32>, intercept: f32) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Fitted coefficients in column order.
    #[must_use]
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Fitted intercept.
    #[must_use]
    pub fn intercept(&self) -> f32 {
        self.intercept
    }

    /// Stages this scorer into an artifact writer with standard metadata.
    #[must_use]
    pub fn to_writer(&self) -> ArtifactWriter {
        let mut writer = ArtifactWriter::new();
        writer.set_metadata(META_MODEL, JsonValue::from(MODEL_LINEAR));
        writer.set_metadata(META_N_FEATURES, JsonValue::from(self.coefficients.len() as u64));
        writer.set_metadata(META_TARGET, JsonValue::from(TARGET_COLUMN));
        if self.coefficients.len() == FEATURE_COLUMNS.len() {
            writer.set_metadata(META_FEATURE_NAMES, JsonValue::from(FEATURE_COLUMNS.to_vec()));
        }
        writer.add_tensor(
            "coefficients",
            vec![self.coefficients.len()],
            &self.coefficients,
        );
        writer.add_tensor("intercept", vec![1], &[self.intercept]);
        writer
    }
}

impl Scorer for LinearScorer {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn score(&self, row: &[f32]) -> Result<f32> {
        let weighted: f32 = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum();
        Ok(weighted + self.intercept)
    }
}
