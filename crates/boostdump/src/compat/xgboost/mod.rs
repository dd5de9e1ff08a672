//! XGBoost text dump support.
//!
//! This module parses the plain-text tree dump written by XGBoost's
//! `dump_model` / `get_dump` into a native [`Forest`](crate::repr::gbdt::Forest),
//! resolving split feature names through a [`FeatureMap`].

mod dump;
mod fmap;

pub use dump::{parse_dump, MalformedModelError, XgbDump};
pub use fmap::{FeatureKind, FeatureMap, FeatureMapError};
