//! Feature data access for prediction.

mod accessor;

pub use accessor::{FeatureVector, SampleAccessor};
