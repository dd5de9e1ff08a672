//! Sample accessor trait for tree traversal.
//!
//! [`SampleAccessor`] gives read-only access to the features of one sample
//! (row). Missing values are explicit: [`SampleAccessor::feature`] returns
//! `None` for an absent value, and traversal routes `None` down the node's
//! recorded missing branch.
//!
//! # Implementations
//!
//! - `[Option<f32>]` / [`FeatureVector`]: explicit missing slots; a
//!   `Some(NaN)` slot is missing too
//! - `[f32]`: NaN is the agreed missing sentinel and becomes `None` here,
//!   before any comparison is made
//! - `ndarray::ArrayView1<f32>`: same NaN convention, used by batch prediction
//!
//! # Example
//!
//! ```
//! use boostdump::data::{FeatureVector, SampleAccessor};
//!
//! let dense: &[f32] = &[0.5, f32::NAN];
//! assert_eq!(dense.feature(0), Some(0.5));
//! assert_eq!(dense.feature(1), None);
//!
//! let sparse = FeatureVector::from(vec![Some(1.0), None]);
//! assert_eq!(sparse.n_features(), 2);
//! assert_eq!(sparse.feature(1), None);
//! ```

/// Access features for a single sample.
///
/// Callers must only request indices below [`n_features`](Self::n_features);
/// the evaluator checks the vector length once before traversal.
pub trait SampleAccessor {
    /// Get the feature value at the given index, `None` if missing.
    fn feature(&self, index: usize) -> Option<f32>;

    /// Number of feature slots in this sample.
    fn n_features(&self) -> usize;
}

#[inline]
fn present(value: f32) -> Option<f32> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

impl SampleAccessor for [f32] {
    #[inline]
    fn feature(&self, index: usize) -> Option<f32> {
        present(self[index])
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

// Enables `&[0.5f32, 1.0]` syntax without slicing.
impl<const N: usize> SampleAccessor for [f32; N] {
    #[inline]
    fn feature(&self, index: usize) -> Option<f32> {
        present(self[index])
    }

    #[inline]
    fn n_features(&self) -> usize {
        N
    }
}

impl SampleAccessor for [Option<f32>] {
    #[inline]
    fn feature(&self, index: usize) -> Option<f32> {
        self[index].and_then(present)
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

impl SampleAccessor for Vec<f32> {
    #[inline]
    fn feature(&self, index: usize) -> Option<f32> {
        self.as_slice().feature(index)
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

impl SampleAccessor for ndarray::ArrayView1<'_, f32> {
    #[inline]
    fn feature(&self, index: usize) -> Option<f32> {
        present(self[index])
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.len()
    }
}

impl<T: SampleAccessor + ?Sized> SampleAccessor for &T {
    #[inline]
    fn feature(&self, index: usize) -> Option<f32> {
        (**self).feature(index)
    }

    #[inline]
    fn n_features(&self) -> usize {
        (**self).n_features()
    }
}

/// Owned feature vector with explicit missing slots.
///
/// Index `i` holds the value of feature `i` as referenced by split nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    values: Vec<Option<f32>>,
}

impl FeatureVector {
    /// A vector of `n_features` missing values.
    pub fn missing(n_features: usize) -> Self {
        Self {
            values: vec![None; n_features],
        }
    }

    /// Build from dense values, treating NaN as missing.
    pub fn from_dense(values: &[f32]) -> Self {
        Self {
            values: values.iter().map(|&v| present(v)).collect(),
        }
    }

    /// Set feature `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_features()`.
    pub fn set(&mut self, index: usize, value: f32) {
        self.values[index] = present(value);
    }

    /// Mark feature `index` as missing.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_features()`.
    pub fn clear(&mut self, index: usize) {
        self.values[index] = None;
    }

    pub fn as_slice(&self) -> &[Option<f32>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Option<f32>>> for FeatureVector {
    /// `Some(NaN)` slots become missing.
    fn from(values: Vec<Option<f32>>) -> Self {
        Self {
            values: values.into_iter().map(|v| v.and_then(present)).collect(),
        }
    }
}

impl SampleAccessor for FeatureVector {
    #[inline]
    fn feature(&self, index: usize) -> Option<f32> {
        self.values[index]
    }

    #[inline]
    fn n_features(&self) -> usize {
        self.values.len()
    }
}
