//! Gradient-boosted decision tree (GBDT) canonical representations.

/// Node identifier as written in the dump (`<id>:` prefix).
pub type NodeId = u32;

pub mod builder;
pub mod forest;
pub mod node;
pub mod tree;

pub use builder::TreeBuilder;
pub use forest::{Forest, ForestError};
pub use node::{Node, NodeKind, Split};
pub use tree::{Tree, TreeValidationError};
