//! Memoized model loading and the prediction entry point.
//!
//! [`ModelGateway`] owns a write-once slot for the loaded model. The first
//! successful [`ModelGateway::load`] reads the artifact from disk and
//! publishes the handle; every later call returns the same handle without
//! touching the filesystem. A failed load publishes nothing, so a later
//! call with a corrected path still succeeds. Nothing here is a hidden
//! global: callers hold the gateway and the handles it hands out.
//!
//! # Example
//!
//! ```no_run
//! use pronosticar::features::FeatureRecord;
//! use pronosticar::gateway::{predict, ModelGateway};
//!
//! # fn main() -> pronosticar::error::Result<()> {
//! let gateway = ModelGateway::new();
//! let model = gateway.load("bmsp.prn")?;
//! let vector = FeatureRecord::default().encode()?;
//! let sales = predict(model.as_ref(), &vector)?;
//! println!("predicted sales: {sales}");
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::encoding::FeatureVector;
use crate::error::{Error, Result};
use crate::model::{SalesModel, Scorer};

/// Loads the sales model once and hands out shared handles.
#[derive(Debug, Default)]
pub struct ModelGateway {
    slot: OnceLock<Arc<SalesModel>>,
    load_guard: Mutex<()>,
}

impl ModelGateway {
    /// Creates a gateway with an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized model, loading it from `path` on first call.
    ///
    /// Double-checked: the fast path reads the slot without locking; the
    /// slow path serializes loads so a cold start with several callers
    /// reads the artifact once. After a success the `path` argument is
    /// ignored, matching a slot that is already warm.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactNotFound`] or [`Error::ArtifactCorrupt`] from the
    /// underlying load. The slot stays unset on failure.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<SalesModel>> {
        if let Some(model) = self.slot.get() {
            return Ok(Arc::clone(model));
        }
        let _guard = self
            .load_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = self.slot.get() {
            return Ok(Arc::clone(model));
        }
        let model = Arc::new(SalesModel::load(path)?);
        let _ = self.slot.set(Arc::clone(&model));
        Ok(model)
    }

    /// Handle already in the slot, if any.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<SalesModel>> {
        self.slot.get().map(Arc::clone)
    }

    /// Whether a model has been published.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// Scores an encoded vector against an explicit model handle.
///
/// The handle is a parameter rather than gateway state so tests can pass a
/// stub scorer. The vector's arity is fixed by its type; the scorer's is
/// checked here, which makes a mismatched hand-built scorer a request-tier
/// failure instead of a panic.
///
/// # Errors
///
/// [`Error::PredictionError`] when the scorer's arity does not match the
/// vector or the scorer itself fails.
pub fn predict<S: Scorer + ?Sized>(model: &S, features: &FeatureVector) -> Result<f32> {
    let row = features.as_slice();
    if model.n_features() != row.len() {
        return Err(Error::PredictionError {
            reason: format!(
                "model expects {} features, vector has {}",
                model.n_features(),
                row.len()
            ),
        });
    }
    model.score(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::FEATURE_COUNT;
    use crate::model::LinearScorer;

    /// Stub scorer: sum of the row. Deterministic and arity-flexible.
    struct SumScorer {
        arity: usize,
    }

    impl Scorer for SumScorer {
        fn n_features(&self) -> usize {
            self.arity
        }

        fn score(&self, row: &[f32]) -> Result<f32> {
            Ok(row.iter().sum())
        }
    }

    fn unit_vector() -> FeatureVector {
        FeatureVector::from_array([1.0; FEATURE_COUNT])
    }

    fn save_linear(path: &std::path::Path) {
        SalesModel::Linear(LinearScorer::new(vec![1.0; FEATURE_COUNT], 0.0))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_predict_with_stub_scorer() {
        let stub = SumScorer {
            arity: FEATURE_COUNT,
        };
        assert_eq!(predict(&stub, &unit_vector()).unwrap(), 11.0);
        // Same vector, same answer.
        assert_eq!(predict(&stub, &unit_vector()).unwrap(), 11.0);
    }

    #[test]
    fn test_predict_rejects_arity_mismatch() {
        let stub = SumScorer { arity: 5 };
        match predict(&stub, &unit_vector()) {
            Err(Error::PredictionError { reason }) => {
                assert!(reason.contains('5'), "reason: {reason}");
                assert!(reason.contains("11"), "reason: {reason}");
            }
            other => panic!("expected PredictionError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_memoizes_the_first_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.prn");
        save_linear(&path);

        let gateway = ModelGateway::new();
        let first = gateway.load(&path).unwrap();
        // Second call with a nonsense path returns the warm handle untouched.
        let second = gateway.load("does/not/exist.prn").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(gateway.is_loaded());
    }

    #[test]
    fn test_failed_load_leaves_slot_unset_then_retry_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("model.prn");
        save_linear(&good);

        let gateway = ModelGateway::new();
        match gateway.load(dir.path().join("missing.prn")) {
            Err(Error::ArtifactNotFound { .. }) => {}
            other => panic!("expected ArtifactNotFound, got {other:?}"),
        }
        assert!(!gateway.is_loaded());
        assert!(gateway.cached().is_none());

        let model = gateway.load(&good).unwrap();
        assert_eq!(model.n_features(), FEATURE_COUNT);
        assert!(gateway.is_loaded());
    }

    #[test]
    fn test_corrupt_artifact_does_not_publish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.prn");
        std::fs::write(&path, b"PRN1 this is not a model").unwrap();

        let gateway = ModelGateway::new();
        match gateway.load(&path) {
            Err(Error::ArtifactCorrupt { .. }) => {}
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
        assert!(!gateway.is_loaded());
    }

    #[test]
    fn test_cached_returns_the_published_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.prn");
        save_linear(&path);

        let gateway = ModelGateway::new();
        assert!(gateway.cached().is_none());
        let loaded = gateway.load(&path).unwrap();
        let cached = gateway.cached().unwrap();
        assert!(Arc::ptr_eq(&loaded, &cached));
    }

    #[test]
    fn test_concurrent_loads_share_one_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.prn");
        save_linear(&path);

        let gateway = ModelGateway::new();
        let handles: Vec<Arc<SalesModel>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| gateway.load(&path).unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], handle));
        }
    }

    #[test]
    fn test_prediction_through_loaded_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.prn");
        save_linear(&path);

        let gateway = ModelGateway::new();
        let model = gateway.load(&path).unwrap();
        let vector = crate::features::FeatureRecord::default().encode().unwrap();
        // Unit coefficients: prediction is the sum of the encoded columns.
        let expected: f32 = vector.as_slice().iter().sum();
        assert_eq!(predict(model.as_ref(), &vector).unwrap(), expected);
        assert_eq!(model.predict(&vector).unwrap(), expected);
    }
}
