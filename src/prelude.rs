//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use pronosticar::prelude::*;
//! ```

pub use crate::encoding::{encode, FeatureVector, FEATURE_COUNT};
pub use crate::error::{Error, Result, Stage};
pub use crate::features::{FeatureRecord, FEATURE_COLUMNS, TARGET_COLUMN};
pub use crate::gateway::{predict, ModelGateway};
pub use crate::model::{FlatTree, LinearScorer, SalesModel, Scorer, TreeEnsembleScorer};
pub use crate::report::{format_currency, headline, summary};
