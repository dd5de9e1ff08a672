//! Model explanations.
//!
//! - [`compute_forest_importance`]: per-feature split count, gain and cover

mod importance;

pub use importance::{compute_forest_importance, ExplainError, FeatureImportance, ImportanceType};
