//! Model loading configuration.
//!
//! The text dump carries tree structure only. Everything else a prediction
//! needs (task, class count, base score, feature names) comes from a
//! [`ModelConfig`], built with its validating builder or deserialized from
//! JSON.
//!
//! # Example
//!
//! ```
//! use boostdump::model::{BaseScore, ModelConfig};
//!
//! let config = ModelConfig::builder()
//!     .task("multi:softprob")
//!     .num_classes(3)
//!     .base_score(BaseScore::Single(0.5))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.num_classes, 3);
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base score must be finite, got {0}")]
    NonFiniteBaseScore(f32),
    #[error("per-group base score is empty")]
    EmptyBaseScore,
    #[error("base score has {found} entries but the model has {expected} output groups")]
    BaseScoreLength { expected: usize, found: usize },
    #[error("duplicate feature name `{0}`")]
    DuplicateFeatureName(String),
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// BaseScore
// =============================================================================

/// Initial raw score added before any tree.
///
/// Deserializes from a bare number or an array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseScore {
    /// Same value for every output group.
    Single(f32),
    /// One value per output group.
    PerGroup(Vec<f32>),
}

impl BaseScore {
    fn values(&self) -> &[f32] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::PerGroup(v) => v,
        }
    }

    /// Expand to exactly `n_groups` values.
    pub fn resolve(&self, n_groups: usize) -> Result<Vec<f32>, ConfigError> {
        match self {
            Self::Single(v) => Ok(vec![*v; n_groups]),
            Self::PerGroup(v) if v.len() == n_groups => Ok(v.clone()),
            Self::PerGroup(v) => Err(ConfigError::BaseScoreLength {
                expected: n_groups,
                found: v.len(),
            }),
        }
    }
}

// =============================================================================
// ModelConfig
// =============================================================================

/// Configuration for loading a model from a text dump.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Task tag (`regression`, `binary`, `multiclass` or an XGBoost
    /// objective name). Default: `regression`.
    #[builder(into, default = String::from("regression"))]
    pub task: String,

    /// Number of classes. 0 or 1 for regression and binary tasks.
    #[builder(default)]
    pub num_classes: usize,

    /// Base score. `None` starts every group at 0.0.
    pub base_score: Option<BaseScore>,

    /// Feature names in input order, as written in the dump's split
    /// conditions. `None` means the dump uses `f0`, `f1`, ...
    pub feature_names: Option<Vec<String>>,

    /// Threads for batch prediction: 0 = auto, 1 = sequential.
    #[builder(default)]
    pub n_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            task: String::from("regression"),
            num_classes: 0,
            base_score: None,
            feature_names: None,
            n_threads: 0,
        }
    }
}

/// Custom finishing function that validates the config.
impl<S: model_config_builder::IsComplete> ModelConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-finite or empty base score or a
    /// repeated feature name.
    pub fn build(self) -> Result<ModelConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ModelConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base_score) = &self.base_score {
            let values = base_score.values();
            if values.is_empty() {
                return Err(ConfigError::EmptyBaseScore);
            }
            if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
                return Err(ConfigError::NonFiniteBaseScore(bad));
            }
        }

        if let Some(names) = &self.feature_names {
            let mut seen = std::collections::HashSet::with_capacity(names.len());
            if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
                return Err(ConfigError::DuplicateFeatureName(dup.clone()));
            }
        }

        Ok(())
    }

    /// Base score for a model with `n_groups` outputs.
    pub fn base_scores(&self, n_groups: usize) -> Result<Vec<f32>, ConfigError> {
        match &self.base_score {
            Some(base_score) => base_score.resolve(n_groups),
            None => Ok(vec![0.0; n_groups]),
        }
    }
}
