//! Tree node types as they appear in a dump.

use super::NodeId;

/// Numeric split of an internal node.
///
/// Samples go to `yes` when `value < threshold`, to `no` otherwise, and to
/// `missing` when the value is absent. `missing` equals `yes` or `no`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub feature: u32,
    pub threshold: f32,
    pub yes: NodeId,
    pub no: NodeId,
    pub missing: NodeId,
}

impl Split {
    /// True if missing values follow the `yes` branch.
    #[inline]
    pub fn missing_goes_yes(&self) -> bool {
        self.missing == self.yes
    }
}

/// Node payload: a decision point or a terminal contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Internal(Split),
    Leaf(f32),
}

/// One node of a tree, keyed by its dump id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Split gain (`gain=` in with-stats dumps). Internal nodes only.
    pub gain: Option<f32>,
    /// Sum of hessians of samples reaching the node (`cover=`).
    pub cover: Option<f32>,
}

impl Node {
    pub fn leaf(id: NodeId, value: f32) -> Self {
        Self {
            id,
            kind: NodeKind::Leaf(value),
            gain: None,
            cover: None,
        }
    }

    pub fn internal(id: NodeId, split: Split) -> Self {
        Self {
            id,
            kind: NodeKind::Internal(split),
            gain: None,
            cover: None,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = Some(gain);
        self
    }

    pub fn with_cover(mut self, cover: f32) -> Self {
        self.cover = Some(cover);
        self
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}
