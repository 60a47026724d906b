//! Gradient-boosted regression trees in flattened form.
//!
//! Each tree is five parallel arrays indexed by node id. A negative feature
//! index marks a leaf, and `value` then holds the leaf weight; internal
//! nodes route left when `row[feature] < threshold`, right otherwise. The
//! ensemble prediction is `base_score` plus the sum of one leaf per tree.

use serde_json::Value as JsonValue;

use crate::artifact::ArtifactWriter;
use crate::error::{Error, Result};
use crate::features::{FEATURE_COLUMNS, TARGET_COLUMN};
use crate::model::{
    Scorer, META_FEATURE_NAMES, META_MODEL, META_N_FEATURES, META_N_TREES, META_TARGET,
    MODEL_BOOSTED_TREES,
};

/// One regression tree in flattened parallel-array form.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTree {
    feature: Vec<i32>,
    threshold: Vec<f32>,
    left: Vec<usize>,
    right: Vec<usize>,
    value: Vec<f32>,
}

impl FlatTree {
    /// Builds a tree from its parallel arrays, validating the structure.
    ///
    /// `n_features` bounds the feature indices of internal nodes. All five
    /// arrays must share one nonzero length, and child indices must stay
    /// inside it.
    ///
    /// # Errors
    ///
    /// Returns a reason string naming the first structural defect.
    pub fn new(
        n_features: usize,
        feature: Vec<i32>,
        threshold: Vec<f32>,
        left: Vec<usize>,
        right: Vec<usize>,
        value: Vec<f32>,
    ) -> std::result::Result<Self, String> {
        let n_nodes = feature.len();
        if n_nodes == 0 {
            return Err("tree has no nodes".to_string());
        }
        if threshold.len() != n_nodes
            || left.len() != n_nodes
            || right.len() != n_nodes
            || value.len() != n_nodes
        {
            return Err(format!(
                "tree arrays disagree on node count: feature {}, threshold {}, left {}, right {}, value {}",
                n_nodes,
                threshold.len(),
                left.len(),
                right.len(),
                value.len()
            ));
        }
        for node in 0..n_nodes {
            let f = feature[node];
            if f < 0 {
                continue; // leaf
            }
            if f as usize >= n_features {
                return Err(format!(
                    "node {node} splits on feature {f}, but the model has {n_features} features"
                ));
            }
            if left[node] >= n_nodes || right[node] >= n_nodes {
                return Err(format!(
                    "node {node} has child out of range (left {}, right {}, nodes {n_nodes})",
                    left[node], right[node]
                ));
            }
        }
        Ok(Self {
            feature,
            threshold,
            left,
            right,
            value,
        })
    }

    /// Number of nodes, leaves included.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.feature.len()
    }

    /// Routes `row` from the root to a leaf and returns its value.
    ///
    /// # Errors
    ///
    /// [`Error::PredictionError`] if traversal visits more nodes than the
    /// tree holds, which only a cyclic child layout can cause.
    fn leaf_value(&self, row: &[f32]) -> Result<f32> {
        let mut node = 0usize;
        let mut steps = 0usize;
        loop {
            let f = self.feature[node];
            if f < 0 {
                return Ok(self.value[node]);
            }
            steps += 1;
            if steps > self.n_nodes() {
                return Err(Error::PredictionError {
                    reason: "tree traversal exceeded node count (cyclic child layout)".to_string(),
                });
            }
            let x = row[f as usize];
            node = if x < self.threshold[node] {
                self.left[node]
            } else {
                self.right[node]
            };
        }
    }

    fn push_tensors(&self, writer: &mut ArtifactWriter, index: usize) {
        let n = self.n_nodes();
        let feature_f32: Vec<f32> = self.feature.iter().map(|&f| f as f32).collect();
        let left_f32: Vec<f32> = self.left.iter().map(|&i| i as f32).collect();
        let right_f32: Vec<f32> = self.right.iter().map(|&i| i as f32).collect();
        writer.add_tensor(format!("tree.{index}.feature"), vec![n], &feature_f32);
        writer.add_tensor(format!("tree.{index}.threshold"), vec![n], &self.threshold);
        writer.add_tensor(format!("tree.{index}.left"), vec![n], &left_f32);
        writer.add_tensor(format!("tree.{index}.right"), vec![n], &right_f32);
        writer.add_tensor(format!("tree.{index}.value"), vec![n], &self.value);
    }
}

/// Boosted ensemble of [`FlatTree`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsembleScorer {
    n_features: usize,
    base_score: f32,
    trees: Vec<FlatTree>,
}

impl TreeEnsembleScorer {
    /// Builds an ensemble. Trees must already be validated against
    /// `n_features` (see [`FlatTree::new`]); an empty ensemble scores every
    /// row to `base_score`.
    #[must_use]
    pub fn new(n_features: usize, base_score: f32, trees: Vec<FlatTree>) -> Self {
        Self {
            n_features,
            base_score,
            trees,
        }
    }

    /// Ensemble-wide additive offset.
    #[must_use]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Number of boosted trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Stages this scorer into an artifact writer with standard metadata.
    #[must_use]
    pub fn to_writer(&self) -> ArtifactWriter {
        let mut writer = ArtifactWriter::new();
        writer.set_metadata(META_MODEL, JsonValue::from(MODEL_BOOSTED_TREES));
        writer.set_metadata(META_N_FEATURES, JsonValue::from(self.n_features as u64));
        writer.set_metadata(META_N_TREES, JsonValue::from(self.trees.len() as u64));
        writer.set_metadata(META_TARGET, JsonValue::from(TARGET_COLUMN));
        if self.n_features == FEATURE_COLUMNS.len() {
            writer.set_metadata(META_FEATURE_NAMES, JsonValue::from(FEATURE_COLUMNS.to_vec()));
        }
        writer.add_tensor("base_score", vec![1], &[self.base_score]);
        for (index, tree) in self.trees.iter().enumerate() {
            tree.push_tensors(&mut writer, index);
        }
        writer
    }
}

impl Scorer for TreeEnsembleScorer {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn score(&self, row: &[f32]) -> Result<f32> {
        let mut total = self.base_score;
        for tree in &self.trees {
            total += tree.leaf_value(row)?;
        }
        Ok(total)
    }
}
