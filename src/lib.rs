//! Pronosticar: retail sales prediction core in pure Rust.
//!
//! Pronosticar turns a typed product/outlet record into the fixed-order
//! numeric vector a pre-trained Big Mart sales model expects, loads that
//! model once from a binary artifact, and scores requests against an
//! explicit handle.
//!
//! # Quick Start
//!
//! ```
//! use pronosticar::prelude::*;
//!
//! // Encode the stock form values into the model's column order.
//! let record = FeatureRecord::default();
//! let vector = record.encode().unwrap();
//! assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
//!
//! // Score against an explicit model handle.
//! let model = SalesModel::Linear(LinearScorer::new(vec![0.0; 11], 2181.29));
//! let sales = predict(&model, &vector).unwrap();
//! assert_eq!(format_currency(sales), "$2,181.29");
//! ```
//!
//! # Modules
//!
//! - [`features`]: Typed input record and field domains
//! - [`encoding`]: Label tables and the fixed-order feature vector
//! - [`artifact`]: PRN binary model artifact reader and writer
//! - [`model`]: Linear and boosted-tree scorers behind the [`model::Scorer`] seam
//! - [`gateway`]: Memoized model loading and the predict entry point
//! - [`report`]: Currency formatting and input summaries
//! - [`error`]: Two-tier error taxonomy (load vs request)

pub mod artifact;
pub mod encoding;
pub mod error;
pub mod features;
pub mod gateway;
pub mod model;
pub mod prelude;
pub mod report;

pub use error::{Error, Result, Stage};
pub use gateway::{predict, ModelGateway};
