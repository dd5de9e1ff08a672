//! Canonical tree representation (SoA) and traversal.
//!
//! [`Tree`] stores nodes in flat parallel arrays indexed by a dense node
//! index (0 = root). Children are dense indices into the same arrays, so the
//! tree owns no pointers and drops in one piece. The dump's own node ids are
//! kept alongside for reporting (e.g. leaf prediction).
//!
//! Trees are only created through [`TreeBuilder`](super::TreeBuilder), which
//! validates the structure before freezing it.

use crate::data::SampleAccessor;
use crate::PredictError;

use super::node::{Node, NodeKind, Split};
use super::NodeId;

/// Structural validation errors for a tree under construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("tree has no root node 0")]
    MissingRoot,
    #[error("node {node} is defined more than once")]
    DuplicateNode { node: NodeId },
    #[error("node {node} references undefined {side} child {child}")]
    UndefinedChild {
        node: NodeId,
        side: &'static str,
        child: NodeId,
    },
    #[error("node {node} has missing child {missing} which is neither yes ({yes}) nor no ({no})")]
    InvalidMissingChild {
        node: NodeId,
        missing: NodeId,
        yes: NodeId,
        no: NodeId,
    },
    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },
    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

/// Structure-of-Arrays tree storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    node_ids: Box<[NodeId]>,
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    yes_children: Box<[u32]>,
    no_children: Box<[u32]>,
    missing_yes: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    /// Gain per node (0 for leaves) when the dump carried it for every split.
    gains: Option<Box<[f32]>>,
    /// Cover per node when the dump carried it for every node.
    covers: Option<Box<[f32]>>,
    depth: usize,
    n_features_required: usize,
}

impl Tree {
    /// Freeze validated nodes into SoA storage.
    ///
    /// `nodes` must be in dense order (root first) and `dense_of` must map
    /// every child id to its position in `nodes`; the builder guarantees both.
    pub(super) fn from_dense_nodes(
        nodes: &[Node],
        dense_of: impl Fn(NodeId) -> u32,
        depth: usize,
    ) -> Self {
        let n = nodes.len();
        let mut node_ids = Vec::with_capacity(n);
        let mut split_indices = vec![0u32; n];
        let mut split_thresholds = vec![0.0f32; n];
        let mut yes_children = vec![0u32; n];
        let mut no_children = vec![0u32; n];
        let mut missing_yes = vec![false; n];
        let mut is_leaf = vec![false; n];
        let mut leaf_values = vec![0.0f32; n];
        let mut gains = vec![0.0f32; n];
        let mut covers = vec![0.0f32; n];
        let mut all_gains = true;
        let mut all_covers = true;
        let mut n_features_required = 0usize;

        for (i, node) in nodes.iter().enumerate() {
            node_ids.push(node.id);
            match node.kind {
                NodeKind::Leaf(value) => {
                    is_leaf[i] = true;
                    leaf_values[i] = value;
                }
                NodeKind::Internal(split) => {
                    split_indices[i] = split.feature;
                    split_thresholds[i] = split.threshold;
                    yes_children[i] = dense_of(split.yes);
                    no_children[i] = dense_of(split.no);
                    missing_yes[i] = split.missing_goes_yes();
                    n_features_required = n_features_required.max(split.feature as usize + 1);
                    match node.gain {
                        Some(g) => gains[i] = g,
                        None => all_gains = false,
                    }
                }
            }
            match node.cover {
                Some(c) => covers[i] = c,
                None => all_covers = false,
            }
        }

        // A single-leaf tree has no splits, so it carries no gain information.
        let has_splits = is_leaf.iter().any(|&leaf| !leaf);

        Self {
            node_ids: node_ids.into_boxed_slice(),
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            yes_children: yes_children.into_boxed_slice(),
            no_children: no_children.into_boxed_slice(),
            missing_yes: missing_yes.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            gains: (all_gains && has_splits).then(|| gains.into_boxed_slice()),
            covers: all_covers.then(|| covers.into_boxed_slice()),
            depth,
            n_features_required,
        }
    }

    // =========================================================================
    // Structure accessors
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    /// Number of nodes on the longest root-to-leaf path (a single leaf has depth 1).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Minimum feature vector length this tree can evaluate.
    #[inline]
    pub fn n_features_required(&self) -> usize {
        self.n_features_required
    }

    #[inline]
    pub fn is_leaf(&self, node: u32) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: u32) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: u32) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn yes_child(&self, node: u32) -> u32 {
        self.yes_children[node as usize]
    }

    #[inline]
    pub fn no_child(&self, node: u32) -> u32 {
        self.no_children[node as usize]
    }

    #[inline]
    pub fn missing_goes_yes(&self, node: u32) -> bool {
        self.missing_yes[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: u32) -> f32 {
        self.leaf_values[node as usize]
    }

    /// The dump id of the node at dense index `node`.
    #[inline]
    pub fn node_id(&self, node: u32) -> NodeId {
        self.node_ids[node as usize]
    }

    pub fn gains(&self) -> Option<&[f32]> {
        self.gains.as_deref()
    }

    pub fn covers(&self) -> Option<&[f32]> {
        self.covers.as_deref()
    }

    /// Reconstruct the node at dense index `node` with its dump ids.
    pub fn node(&self, node: u32) -> Node {
        let idx = node as usize;
        let kind = if self.is_leaf[idx] {
            NodeKind::Leaf(self.leaf_values[idx])
        } else {
            let yes = self.node_id(self.yes_children[idx]);
            let no = self.node_id(self.no_children[idx]);
            NodeKind::Internal(Split {
                feature: self.split_indices[idx],
                threshold: self.split_thresholds[idx],
                yes,
                no,
                missing: if self.missing_yes[idx] { yes } else { no },
            })
        };
        Node {
            id: self.node_ids[idx],
            kind,
            gain: self
                .gains
                .as_ref()
                .filter(|_| !self.is_leaf[idx])
                .map(|g| g[idx]),
            cover: self.covers.as_ref().map(|c| c[idx]),
        }
    }

    /// Iterate over nodes in dense (root-first, depth-first) order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        (0..self.n_nodes() as u32).map(|i| self.node(i))
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Check that `sample` covers every feature this tree splits on.
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

    /// Traverse to a leaf and return its dense index.
    ///
    /// The caller must have checked the sample with
    /// [`check_features`](Self::check_features).
    #[inline]
    pub fn traverse_to_leaf<S: SampleAccessor + ?Sized>(&self, sample: &S) -> u32 {
        let mut node = 0u32;

        while !self.is_leaf(node) {
            let feat_idx = self.split_index(node) as usize;

            node = match sample.feature(feat_idx) {
                None => {
                    if self.missing_goes_yes(node) {
                        self.yes_child(node)
                    } else {
                        self.no_child(node)
                    }
                }
                Some(fvalue) => {
                    if fvalue < self.split_threshold(node) {
                        self.yes_child(node)
                    } else {
                        self.no_child(node)
                    }
                }
            };
        }

        node
    }

    /// Value of the leaf reached by `sample`.
    pub fn evaluate<S: SampleAccessor + ?Sized>(&self, sample: &S) -> Result<f32, PredictError> {
        self.check_features(sample)?;
        Ok(self.leaf_value(self.traverse_to_leaf(sample)))
    }

    /// Dump id of the leaf reached by `sample`.
    pub fn leaf_id<S: SampleAccessor + ?Sized>(&self, sample: &S) -> Result<NodeId, PredictError> {
        self.check_features(sample)?;
        Ok(self.node_id(self.traverse_to_leaf(sample)))
    }
}
