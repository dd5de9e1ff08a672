//! Raw score to calibrated output.
//!
//! [`OutputTransform`] maps per-group raw scores to the task's output space:
//! unchanged for regression, logistic for binary classification, softmax for
//! multiclass. It is derived from [`TaskKind`](super::TaskKind) and applied
//! after the forest has summed every tree.

use serde::{Deserialize, Serialize};

/// Inference-time output transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTransform {
    /// output = raw score.
    #[default]
    Identity,
    /// output = 1 / (1 + exp(-raw)).
    Sigmoid,
    /// output_i = exp(raw_i) / sum_j exp(raw_j).
    Softmax,
}

impl OutputTransform {
    /// Transform the raw scores of a single row in place.
    ///
    /// NaN and infinite inputs do not panic: sigmoid saturates infinities, and
    /// a NaN anywhere in a softmax row propagates to the output.
    #[inline]
    pub fn apply(&self, row: &mut [f32]) {
        match self {
            Self::Identity => {}
            Self::Sigmoid => {
                for x in row.iter_mut() {
                    *x = sigmoid(*x);
                }
            }
            Self::Softmax => softmax_inplace(row),
        }
    }

    /// Transform a row-major `(n_rows, n_outputs)` buffer in place.
    ///
    /// # Panics
    ///
    /// Panics if `n_outputs` is 0 or `predictions.len()` is not a multiple of it.
    pub fn transform_inplace(&self, predictions: &mut [f32], n_outputs: usize) {
        assert!(n_outputs > 0, "n_outputs must be > 0");
        assert!(
            predictions.len() % n_outputs == 0,
            "predictions.len() must be divisible by n_outputs"
        );

        if matches!(self, Self::Identity) {
            return;
        }
        for row in predictions.chunks_exact_mut(n_outputs) {
            self.apply(row);
        }
    }
}

/// Logistic function in the two-branch form, so `exp` never sees a large
/// positive argument.
#[inline]
pub(crate) fn sigmoid(x: f32) -> f32 {
    let x = x.clamp(-500.0, 500.0);
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Softmax with max subtraction.
#[inline]
fn softmax_inplace(row: &mut [f32]) {
    if row.is_empty() {
        return;
    }

    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }

    if sum > 0.0 {
        for x in row.iter_mut() {
            *x /= sum;
        }
    }
}
