//! Canonical model representations.

pub mod gbdt;
