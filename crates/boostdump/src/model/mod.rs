//! High-level model wrappers.
//!
//! # Overview
//!
//! - [`GBDTModel`]: tree ensemble loaded from a text dump
//! - [`ModelConfig`]: task, class count and base score for loading
//! - [`Prediction`]: task-shaped prediction result
//! - [`ModelMeta`]: shape and task metadata
//!
//! # Example
//!
//! ```
//! use boostdump::model::{GBDTModel, ModelConfig};
//!
//! let dump = "booster[0]:\n0:[f0<0.5] yes=1,no=2,missing=1\n\t1:leaf=1.5\n\t2:leaf=2.5\n";
//! let model = GBDTModel::from_dump(dump, &ModelConfig::default()).unwrap();
//!
//! assert_eq!(model.predict_raw(&[0.1f32]).unwrap(), vec![1.5]);
//! ```

mod config;
mod gbdt;
mod meta;
mod prediction;
mod transform;

pub use config::{BaseScore, ConfigError, ModelConfig, ModelConfigBuilder};
pub use gbdt::GBDTModel;
pub use meta::{ModelMeta, TaskKind};
pub use prediction::Prediction;
pub use transform::OutputTransform;
