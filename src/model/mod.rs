//! Model handles and the scoring seam.
//!
//! [`SalesModel`] is the explicit handle predictions run against: callers
//! load one, hold it, and pass it to [`crate::gateway::predict`]. The
//! [`Scorer`] trait is the seam under the handle; tests substitute a stub
//! scorer without touching any process state.
//!
//! # Example
//!
//! ```
//! use pronosticar::model::{LinearScorer, Scorer};
//!
//! let model = LinearScorer::new(vec![1.0, 2.0, 3.0], 0.5);
//! assert_eq!(model.n_features(), 3);
//! assert_eq!(model.score(&[1.0, 1.0, 1.0]).unwrap(), 6.5);
//! ```

pub mod linear;
pub mod trees;

pub use linear::LinearScorer;
pub use trees::{FlatTree, TreeEnsembleScorer};

use std::path::Path;

use crate::artifact::{ArtifactReader, ArtifactWriter};
use crate::encoding::{FeatureVector, FEATURE_COUNT};
use crate::error::Result;
use crate::features::FEATURE_COLUMNS;

/// Metadata key naming the scorer kind.
pub const META_MODEL: &str = "model";
/// Metadata key for the expected input arity.
pub const META_N_FEATURES: &str = "n_features";
/// Metadata key for the canonical column names.
pub const META_FEATURE_NAMES: &str = "feature_names";
/// Metadata key for the predicted column name.
pub const META_TARGET: &str = "target";
/// Metadata key for the boosted-tree count.
pub const META_N_TREES: &str = "n_trees";

/// `model` metadata value for [`LinearScorer`] artifacts.
pub const MODEL_LINEAR: &str = "linear";
/// `model` metadata value for [`TreeEnsembleScorer`] artifacts.
pub const MODEL_BOOSTED_TREES: &str = "boosted_trees";

/// Scores one encoded row.
pub trait Scorer {
    /// Number of input columns the scorer expects.
    fn n_features(&self) -> usize;

    /// Scores one row. `row.len()` must equal [`Scorer::n_features`];
    /// callers go through [`crate::gateway::predict`], which checks.
    ///
    /// # Errors
    ///
    /// [`crate::error::Error::PredictionError`] when the scorer cannot
    /// produce a value for the row.
    fn score(&self, row: &[f32]) -> Result<f32>;
}

/// A loaded sales model, dispatching over the supported artifact kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum SalesModel {
    /// Dense linear model.
    Linear(LinearScorer),
    /// Gradient-boosted regression trees.
    BoostedTrees(TreeEnsembleScorer),
}

impl SalesModel {
    /// Loads a model from a PRN artifact on disk.
    ///
    /// # Errors
    ///
    /// [`crate::error::Error::ArtifactNotFound`] when the path does not
    /// exist; [`crate::error::Error::ArtifactCorrupt`] when the artifact
    /// cannot be decoded or fails schema validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = ArtifactReader::open(path)?;
        Self::from_reader(&reader)
    }

    /// Assembles a model from an already-parsed artifact.
    ///
    /// Schema validation happens here, not at first predict: the artifact
    /// must declare `n_features` equal to [`FEATURE_COUNT`], its
    /// `feature_names` (when present) must match the canonical layout, and
    /// tensor shapes must agree with the declared arity.
    ///
    /// # Errors
    ///
    /// [`crate::error::Error::ArtifactCorrupt`] naming the first schema or
    /// structure defect.
    pub fn from_reader(reader: &ArtifactReader) -> Result<Self> {
        let n_features = reader.require_u64(META_N_FEATURES)? as usize;
        if n_features != FEATURE_COUNT {
            return Err(reader.corrupt(format!(
                "schema mismatch: artifact expects {n_features} features, the encoder produces {FEATURE_COUNT}"
            )));
        }
        if let Some(value) = reader.metadata(META_FEATURE_NAMES) {
            let names: Vec<&str> = value
                .as_array()
                .map(|entries| entries.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            if names.len() != FEATURE_COLUMNS.len()
                || names.iter().zip(FEATURE_COLUMNS.iter()).any(|(a, b)| a != b)
            {
                return Err(
                    reader.corrupt("feature_names does not match the canonical columns".to_string())
                );
            }
        }

        match reader.require_str(META_MODEL)? {
            MODEL_LINEAR => Self::linear_from_reader(reader, n_features),
            MODEL_BOOSTED_TREES => Self::trees_from_reader(reader, n_features),
            other => Err(reader.corrupt(format!("unknown model kind '{other}'"))),
        }
    }

    fn linear_from_reader(reader: &ArtifactReader, n_features: usize) -> Result<Self> {
        let coefficients = reader.tensor_f32("coefficients")?;
        if coefficients.len() != n_features {
            return Err(reader.corrupt(format!(
                "coefficients tensor has {} values for {n_features} features",
                coefficients.len()
            )));
        }
        let intercept = reader.tensor_f32("intercept")?;
        let [intercept] = intercept.as_slice() else {
            return Err(reader.corrupt(format!(
                "intercept tensor has {} values, expected 1",
                intercept.len()
            )));
        };
        Ok(Self::Linear(LinearScorer::new(coefficients, *intercept)))
    }

    fn trees_from_reader(reader: &ArtifactReader, n_features: usize) -> Result<Self> {
        let n_trees = reader.require_u64(META_N_TREES)? as usize;
        // Five tensors per tree, so the index caps any honest count. Checked
        // before the count sizes an allocation.
        let indexed = reader.tensors.len() / 5;
        if n_trees > indexed {
            return Err(reader.corrupt(format!(
                "n_trees says {n_trees}, the tensor index holds at most {indexed}"
            )));
        }
        let base = reader.tensor_f32("base_score")?;
        let [base_score] = base.as_slice() else {
            return Err(reader.corrupt(format!(
                "base_score tensor has {} values, expected 1",
                base.len()
            )));
        };
        let mut trees = Vec::with_capacity(n_trees);
        for index in 0..n_trees {
            let feature = reader.tensor_f32(&format!("tree.{index}.feature"))?;
            let threshold = reader.tensor_f32(&format!("tree.{index}.threshold"))?;
            let left = reader.tensor_f32(&format!("tree.{index}.left"))?;
            let right = reader.tensor_f32(&format!("tree.{index}.right"))?;
            let value = reader.tensor_f32(&format!("tree.{index}.value"))?;
            let tree = FlatTree::new(
                n_features,
                feature.iter().map(|&f| f as i32).collect(),
                threshold,
                left.iter().map(|&i| i as usize).collect(),
                right.iter().map(|&i| i as usize).collect(),
                value,
            )
            .map_err(|reason| reader.corrupt(format!("tree {index}: {reason}")))?;
            trees.push(tree);
        }
        Ok(Self::BoostedTrees(TreeEnsembleScorer::new(
            n_features,
            *base_score,
            trees,
        )))
    }

    /// Kind tag, matching the artifact's `model` metadata value.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => MODEL_LINEAR,
            Self::BoostedTrees(_) => MODEL_BOOSTED_TREES,
        }
    }

    /// Stages this model into an artifact writer.
    #[must_use]
    pub fn to_writer(&self) -> ArtifactWriter {
        match self {
            Self::Linear(model) => model.to_writer(),
            Self::BoostedTrees(model) => model.to_writer(),
        }
    }

    /// Writes this model to a PRN artifact.
    ///
    /// # Errors
    ///
    /// [`crate::error::Error::ArtifactWrite`] when serialization or the
    /// write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_writer().save(path)
    }

    /// Scores an encoded feature vector.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`crate::gateway::predict`].
    pub fn predict(&self, features: &FeatureVector) -> Result<f32> {
        crate::gateway::predict(self, features)
    }
}

impl Scorer for SalesModel {
    fn n_features(&self) -> usize {
        match self {
            Self::Linear(model) => model.n_features(),
            Self::BoostedTrees(model) => model.n_features(),
        }
    }

    fn score(&self, row: &[f32]) -> Result<f32> {
        match self {
            Self::Linear(model) => model.score(row),
            Self::BoostedTrees(model) => model.score(row),
        }
    }
}
