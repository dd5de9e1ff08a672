//! Batch predictor for tree ensembles.
//!
//! [`Predictor`] evaluates a [`Forest`] over a row-major feature matrix.
//! Rows are processed in blocks; with [`Parallelism::Parallel`] blocks are
//! spread over the rayon pool. Each row is still summed tree by tree in the
//! same order as single-row prediction, so the result does not depend on the
//! parallelism setting or the block size.
//!
//! # Usage
//!
//! ```
//! use boostdump::compat::xgboost::{parse_dump, FeatureMap};
//! use boostdump::inference::gbdt::Predictor;
//! use boostdump::Parallelism;
//! use ndarray::array;
//!
//! let dump = "booster[0]:\n0:[f0<0.5] yes=1,no=2,missing=1\n1:leaf=-1\n2:leaf=1\n";
//! let forest = parse_dump(dump, &FeatureMap::default(), 1).unwrap();
//!
//! let features = array![[0.1f32], [0.9]];
//! let output = Predictor::new(&forest)
//!     .predict(features.view(), Parallelism::Sequential)
//!     .unwrap();
//! assert_eq!(output, array![[-1.0f32], [1.0]]);
//! ```

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut2, Axis};

use crate::data::SampleAccessor;
use crate::model::OutputTransform;
use crate::repr::gbdt::Forest;
use crate::{Parallelism, PredictError};

/// Default block size for batch processing (matches XGBoost).
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Batch predictor borrowing a forest.
#[derive(Debug, Clone)]
pub struct Predictor<'f> {
    forest: &'f Forest,
    transform: OutputTransform,
    /// Number of rows handed to one worker at a time
    block_size: usize,
}

impl<'f> Predictor<'f> {
    /// Predictor producing raw scores.
    #[inline]
    pub fn new(forest: &'f Forest) -> Self {
        Self {
            forest,
            transform: OutputTransform::Identity,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Apply `transform` to every row's scores.
    #[inline]
    pub fn with_transform(mut self, transform: OutputTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the number of rows per block. Values below 1 are treated as 1.
    #[inline]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn forest(&self) -> &Forest {
        self.forest
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> usize {
        self.forest.n_groups() as usize
    }

    /// Predict one row into `output`.
    ///
    /// # Panics
    ///
    /// Panics if `output.len() != self.n_groups()`.
    pub fn predict_row_into<S: SampleAccessor + ?Sized>(
        &self,
        features: &S,
        output: &mut [f32],
    ) -> Result<(), PredictError> {
        self.forest.predict_raw_into(features, output)?;
        self.transform.apply(output);
        Ok(())
    }

    /// Predict every row of `features` (`[n_samples, n_features]`) into
    /// `output` (`[n_samples, n_groups]`).
    ///
    /// The column count is checked once for the whole matrix; on error
    /// `output` is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `output` does not have shape `(n_samples, n_groups)`.
    pub fn predict_into(
        &self,
        features: ArrayView2<f32>,
        parallelism: Parallelism,
        mut output: ArrayViewMut2<f32>,
    ) -> Result<(), PredictError> {
        let n_samples = features.nrows();
        let n_groups = self.n_groups();
        assert_eq!(
            output.shape(),
            &[n_samples, n_groups],
            "output shape must match (n_samples, n_groups)"
        );

        let required = self.forest.n_features_required();
        if features.ncols() < required {
            return Err(PredictError::FeatureIndexOutOfRange {
                required,
                provided: features.ncols(),
            });
        }
        if n_samples == 0 {
            return Ok(());
        }

        let feature_chunks = features.axis_chunks_iter(Axis(0), self.block_size);
        let output_chunks = output.axis_chunks_iter_mut(Axis(0), self.block_size);

        parallelism.maybe_par_bridge_for_each(
            feature_chunks.zip(output_chunks),
            |(feat_block, mut out_block)| {
                let mut scores = vec![0.0f32; n_groups];
                for (row, mut out_row) in feat_block.rows().into_iter().zip(out_block.rows_mut()) {
                    self.forest.accumulate_unchecked(&row, &mut scores);
                    self.transform.apply(&mut scores);
                    out_row.assign(&ArrayView1::from(scores.as_slice()));
                }
            },
        );

        Ok(())
    }

    /// Predict with allocation. Returns a `[n_samples, n_groups]` matrix.
    pub fn predict(
        &self,
        features: ArrayView2<f32>,
        parallelism: Parallelism,
    ) -> Result<Array2<f32>, PredictError> {
        let mut output = Array2::<f32>::zeros((features.nrows(), self.n_groups()));
        self.predict_into(features, parallelism, output.view_mut())?;
        Ok(output)
    }
}
