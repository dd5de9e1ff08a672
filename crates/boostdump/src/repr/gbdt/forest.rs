//! Canonical forest representation (collection of trees).

use crate::data::SampleAccessor;
use crate::PredictError;

use super::{NodeId, Tree};

/// Errors raised while assembling a [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestError {
    #[error("forest needs at least one output group")]
    NoGroups,
    #[error("{n_trees} trees is not a whole number of rounds for {n_groups} groups")]
    TreeCountMismatch { n_trees: usize, n_groups: u32 },
    #[error("base score has {len} entries for {n_groups} groups")]
    BaseScoreLenMismatch { n_groups: u32, len: usize },
}

/// Forest of decision trees.
///
/// Tree `i` contributes to output group `i mod n_groups`, so a multiclass
/// forest stores its trees round by round, one tree per class. Group
/// assignment is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    n_groups: u32,
    base_score: Vec<f32>,
    n_features_required: usize,
}

impl Forest {
    /// Build from trees in round-major order, assigning groups by position.
    ///
    /// The base score starts at 0.0 for every group.
    pub fn from_trees(trees: Vec<Tree>, n_groups: u32) -> Result<Self, ForestError> {
        if n_groups == 0 {
            return Err(ForestError::NoGroups);
        }
        if trees.len() % n_groups as usize != 0 {
            return Err(ForestError::TreeCountMismatch {
                n_trees: trees.len(),
                n_groups,
            });
        }

        let tree_groups = (0..trees.len()).map(|i| (i % n_groups as usize) as u32).collect();
        let n_features_required = trees.iter().map(Tree::n_features_required).max().unwrap_or(0);
        Ok(Self {
            trees,
            tree_groups,
            n_groups,
            base_score: vec![0.0; n_groups as usize],
            n_features_required,
        })
    }

    /// Replace the per-group base score.
    pub fn with_base_score(mut self, base_score: Vec<f32>) -> Result<Self, ForestError> {
        if base_score.len() != self.n_groups as usize {
            return Err(ForestError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: base_score.len(),
            });
        }
        self.base_score = base_score;
        Ok(self)
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    /// Number of boosting rounds (trees per group).
    #[inline]
    pub fn n_rounds(&self) -> usize {
        self.trees.len() / self.n_groups as usize
    }

    #[inline]
    pub fn base_score(&self) -> &[f32] {
        &self.base_score
    }

    /// Minimum feature vector length the forest can evaluate.
    #[inline]
    pub fn n_features_required(&self) -> usize {
        self.n_features_required
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    #[inline]
    pub fn tree_groups(&self) -> &[u32] {
        &self.tree_groups
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Iterate over trees with their group assignments.
    pub fn trees_with_groups(&self) -> impl Iterator<Item = (&Tree, u32)> {
        self.trees
            .iter()
            .zip(self.tree_groups.iter())
            .map(|(t, &g)| (t, g))
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Check that `sample` covers every feature any tree splits on.
    #[inline]
    pub fn check_features<S: SampleAccessor + ?Sized>(&self, sample: &S) -> Result<(), PredictError> {
        let provided = sample.n_features();
        if provided < self.n_features_required {
            return Err(PredictError::FeatureIndexOutOfRange {
                required: self.n_features_required,
                provided,
            });
        }
        Ok(())
    }

    /// Accumulate raw scores for one sample into `output`.
    ///
    /// `output` is overwritten with the base score and then every tree's
    /// leaf value is added to its group slot, in tree order.
    ///
    /// # Panics
    ///
    /// Panics if `output.len() != self.n_groups()`.
    pub fn predict_raw_into<S: SampleAccessor + ?Sized>(
        &self,
        sample: &S,
        output: &mut [f32],
    ) -> Result<(), PredictError> {
        assert_eq!(
            output.len(),
            self.n_groups as usize,
            "output length must equal n_groups"
        );
        self.check_features(sample)?;
        self.accumulate_unchecked(sample, output);
        Ok(())
    }

    /// [`predict_raw_into`](Self::predict_raw_into) without the length checks.
    /// Callers must have run [`check_features`](Self::check_features).
    #[inline]
    pub(crate) fn accumulate_unchecked<S: SampleAccessor + ?Sized>(&self, sample: &S, output: &mut [f32]) {
        output.copy_from_slice(&self.base_score);

        for (tree, group) in self.trees_with_groups() {
            let leaf_idx = tree.traverse_to_leaf(sample);
            output[group as usize] += tree.leaf_value(leaf_idx);
        }
    }

    /// Raw per-group scores for one sample.
    pub fn predict_raw<S: SampleAccessor + ?Sized>(&self, sample: &S) -> Result<Vec<f32>, PredictError> {
        let mut output = vec![0.0; self.n_groups as usize];
        self.predict_raw_into(sample, &mut output)?;
        Ok(output)
    }

    /// Dump id of the leaf each tree routes `sample` to, in tree order.
    pub fn predict_leaf<S: SampleAccessor + ?Sized>(&self, sample: &S) -> Result<Vec<NodeId>, PredictError> {
        self.check_features(sample)?;
        Ok(self
            .trees
            .iter()
            .map(|tree| tree.node_id(tree.traverse_to_leaf(sample)))
            .collect())
    }
}
