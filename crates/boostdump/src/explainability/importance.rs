//! Feature importance from tree structure and node statistics.
//!
//! Importance is aggregated over every split node of the forest:
//!
//! | Type | Per feature |
//! |------|-------------|
//! | [`Split`](ImportanceType::Split) | number of splits (XGBoost `weight`) |
//! | [`TotalGain`](ImportanceType::TotalGain) | sum of split gains |
//! | [`Gain`](ImportanceType::Gain) | total gain / number of splits |
//! | [`TotalCover`](ImportanceType::TotalCover) | sum of split covers |
//! | [`Cover`](ImportanceType::Cover) | total cover / number of splits |
//!
//! Gain and cover need a dump written with statistics (`with_stats=True`).

use serde::{Deserialize, Serialize};

use crate::repr::gbdt::Forest;

/// Errors raised while computing explanations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplainError {
    #[error("{0} importance needs per-node statistics; load a dump written with stats")]
    MissingNodeStats(&'static str),
}

/// Aggregation used by [`compute_forest_importance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceType {
    #[default]
    Split,
    Gain,
    TotalGain,
    Cover,
    TotalCover,
}

impl ImportanceType {
    fn needs_gain(self) -> bool {
        matches!(self, Self::Gain | Self::TotalGain)
    }

    fn needs_cover(self) -> bool {
        matches!(self, Self::Cover | Self::TotalCover)
    }

    fn is_average(self) -> bool {
        matches!(self, Self::Gain | Self::Cover)
    }
}

/// Dense per-feature importance scores.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    values: Vec<f32>,
    feature_names: Option<Vec<String>>,
    importance_type: ImportanceType,
}

impl FeatureImportance {
    /// Score of every feature, indexed by feature.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn importance_type(&self) -> ImportanceType {
        self.importance_type
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Score of feature `index`, 0 for unused or out-of-range features.
    pub fn get(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Scores scaled to sum to 1. All zeros stay zeros.
    pub fn normalized(&self) -> Vec<f32> {
        let total: f32 = self.values.iter().sum();
        if total > 0.0 {
            self.values.iter().map(|v| v / total).collect()
        } else {
            self.values.clone()
        }
    }

    /// The `k` highest-scoring features as `(index, score)`, highest first.
    /// Ties keep feature order. Features with score 0 are skipped.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .values
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, v)| v > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }

    /// Name-keyed scores of the features used by at least one split, in
    /// feature order. Unnamed models use XGBoost's `f<N>` names.
    pub fn to_named(&self) -> Vec<(String, f32)> {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0.0)
            .map(|(i, &v)| {
                let name = self
                    .feature_names
                    .as_ref()
                    .and_then(|names| names.get(i).cloned())
                    .unwrap_or_else(|| format!("f{i}"));
                (name, v)
            })
            .collect()
    }
}

/// Aggregate `importance_type` over every split of `forest`.
///
/// The result has `max(n_features, forest.n_features_required())` entries.
pub fn compute_forest_importance(
    forest: &Forest,
    n_features: usize,
    importance_type: ImportanceType,
    feature_names: Option<Vec<String>>,
) -> Result<FeatureImportance, ExplainError> {
    let n_features = n_features.max(forest.n_features_required());
    let mut counts = vec![0u32; n_features];
    let mut totals = vec![0.0f64; n_features];

    for tree in forest.trees() {
        let n_splits = tree.n_nodes() - tree.n_leaves();
        if n_splits == 0 {
            continue;
        }
        let gains = tree.gains();
        let covers = tree.covers();
        if importance_type.needs_gain() && gains.is_none() {
            return Err(ExplainError::MissingNodeStats("gain"));
        }
        if importance_type.needs_cover() && covers.is_none() {
            return Err(ExplainError::MissingNodeStats("cover"));
        }

        for node in 0..tree.n_nodes() as u32 {
            if tree.is_leaf(node) {
                continue;
            }
            let feature = tree.split_index(node) as usize;
            counts[feature] += 1;
            totals[feature] += match importance_type {
                ImportanceType::Split => 1.0,
                ImportanceType::Gain | ImportanceType::TotalGain => {
                    gains.map_or(0.0, |g| g[node as usize] as f64)
                }
                ImportanceType::Cover | ImportanceType::TotalCover => {
                    covers.map_or(0.0, |c| c[node as usize] as f64)
                }
            };
        }
    }

    let values = counts
        .iter()
        .zip(&totals)
        .map(|(&count, &total)| match count {
            0 => 0.0,
            n if importance_type.is_average() => (total / n as f64) as f32,
            _ => total as f32,
        })
        .collect();

    Ok(FeatureImportance {
        values,
        feature_names,
        importance_type,
    })
}
