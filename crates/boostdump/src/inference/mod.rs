//! Batch inference for tree ensembles.
//!
//! Single-row prediction lives on [`Forest`](crate::repr::gbdt::Forest) and
//! [`GBDTModel`](crate::model::GBDTModel); this module adds matrix-at-a-time
//! prediction with optional rayon parallelism.

pub mod gbdt;

pub use gbdt::Predictor;
