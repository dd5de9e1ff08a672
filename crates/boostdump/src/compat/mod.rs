//! Loaders for model formats written by external trainers.
//!
//! # XGBoost
//!
//! [`xgboost::XgbDump`] parses the plain-text output of `Booster.dump_model()`
//! (optionally `with_stats=True`) into a native [`Forest`](crate::repr::gbdt::Forest).
//! Feature names in the dump resolve through a [`xgboost::FeatureMap`].

pub mod xgboost;
