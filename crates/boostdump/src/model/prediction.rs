//! Task-shaped prediction results.

use serde::{Deserialize, Serialize};

/// Calibrated output of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Prediction {
    /// Raw score of a regression model.
    Regression { value: f32 },
    /// Probability of the positive class.
    Binary { positive: f32 },
    /// Probability of every class; sums to 1.
    Multiclass { probabilities: Vec<f32> },
}

impl Prediction {
    /// Probability of the negative class (binary only).
    pub fn negative(&self) -> Option<f32> {
        match self {
            Self::Binary { positive } => Some(1.0 - positive),
            _ => None,
        }
    }

    /// Most probable class. The lowest index wins ties.
    ///
    /// For a binary prediction class 1 wins when `positive > 0.5`.
    pub fn class(&self) -> Option<usize> {
        match self {
            Self::Regression { .. } => None,
            Self::Binary { positive } => Some(usize::from(*positive > 0.5)),
            Self::Multiclass { probabilities } => probabilities
                .iter()
                .enumerate()
                .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
                    Some((_, bp)) if bp >= p => best,
                    _ => Some((i, p)),
                })
                .map(|(i, _)| i),
        }
    }

    /// Output values as a flat slice: one value, or one per class.
    pub fn as_slice(&self) -> &[f32] {
        match self {
            Self::Regression { value } => std::slice::from_ref(value),
            Self::Binary { positive } => std::slice::from_ref(positive),
            Self::Multiclass { probabilities } => probabilities,
        }
    }
}
