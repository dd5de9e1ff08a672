//! boostdump: gradient-boosted tree inference from XGBoost text dumps.
//!
//! Loads the plain-text tree dump of a trained ensemble and serves
//! predictions: raw per-class scores and the task's calibrated output
//! (regression value, binary probability, multiclass distribution).
//!
//! # Key Types
//!
//! - [`GBDTModel`] - Loaded model with single-row and batch prediction
//! - [`ModelConfig`] - Task, class count, base score and feature names
//! - [`Prediction`] - Task-shaped prediction result
//! - [`repr::gbdt::Forest`] / [`repr::gbdt::Tree`] - Validated tree storage
//!
//! # Loading a Dump
//!
//! ```
//! use boostdump::{GBDTModel, ModelConfig, Prediction};
//!
//! let dump = "\
//! booster[0]:
//! 0:[bmi<0.00956] yes=1,no=2,missing=1
//! \t1:leaf=38.7487526
//! \t2:leaf=53.0696678
//! ";
//! let config = ModelConfig::builder()
//!     .feature_names(vec!["age".into(), "sex".into(), "bmi".into()])
//!     .build()
//!     .unwrap();
//! let model = GBDTModel::from_dump(dump, &config).unwrap();
//!
//! let prediction = model.predict(&[0.038f32, 0.0507, 0.0617]).unwrap();
//! assert_eq!(prediction, Prediction::Regression { value: 53.0696678 });
//! ```
//!
//! Missing values are `None` in a [`data::FeatureVector`] or NaN in a dense
//! `[f32]`; both follow the split's recorded missing branch.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod compat;
pub mod data;
pub mod explainability;
pub mod inference;
pub mod model;
pub mod repr;
pub mod testing;
pub mod utils;

mod error;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use error::{Error, PredictError};

// High-level model types
pub use model::{GBDTModel, ModelConfig, ModelMeta, OutputTransform, Prediction, TaskKind};

// Parsing
pub use compat::xgboost::{parse_dump, FeatureMap, MalformedModelError};

// Data types
pub use data::{FeatureVector, SampleAccessor};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
