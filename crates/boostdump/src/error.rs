//! Crate-level error types.

use crate::compat::xgboost::{FeatureMapError, MalformedModelError};
use crate::model::ConfigError;
use crate::repr::gbdt::ForestError;

/// Error raised by a single prediction call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    /// The feature vector does not cover every feature index the model splits on.
    #[error("model requires {required} features but the feature vector has {provided}")]
    FeatureIndexOutOfRange { required: usize, provided: usize },
}

/// Error raised while constructing a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed model: {0}")]
    MalformedModel(#[from] MalformedModelError),

    #[error("unsupported task type `{0}`")]
    UnsupportedTaskType(String),

    #[error("task `{task}` does not support {num_classes} classes")]
    InvalidClassCount { task: String, num_classes: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid feature map: {0}")]
    FeatureMap(#[from] FeatureMapError),

    #[error("invalid forest: {0}")]
    Forest(#[from] ForestError),
}
