//! Tree construction from id-keyed nodes.
//!
//! [`TreeBuilder`] collects nodes in any order (dump order, typically
//! depth-first) and [`freeze`](TreeBuilder::freeze)s them into an immutable
//! [`Tree`] once the whole structure validates.

use std::collections::HashMap;

use super::node::{Node, NodeKind};
use super::tree::{Tree, TreeValidationError};
use super::NodeId;

/// Collects nodes of one tree keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    position: HashMap<NodeId, usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n_nodes),
            position: HashMap::with_capacity(n_nodes),
        }
    }

    /// Add a node. Fails if a node with the same id was already added.
    pub fn push(&mut self, node: Node) -> Result<(), TreeValidationError> {
        if self.position.contains_key(&node.id) {
            return Err(TreeValidationError::DuplicateNode { node: node.id });
        }
        self.position.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate the structure and freeze it into a [`Tree`].
    ///
    /// Checks that node 0 exists, every child id is defined, every missing id
    /// is the yes or no id, the graph is acyclic with a single path to each
    /// node, and every node is reachable from the root.
    pub fn freeze(self) -> Result<Tree, TreeValidationError> {
        let n_nodes = self.nodes.len();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        let root = *self
            .position
            .get(&0)
            .ok_or(TreeValidationError::MissingRoot)?;

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut order: Vec<usize> = Vec::with_capacity(n_nodes);
        let mut depth = 0usize;
        // (position, phase, depth of this node)
        let mut stack: Vec<(usize, u8, usize)> = vec![(root, 0, 1)];

        while let Some((pos, phase, level)) = stack.pop() {
            let node = &self.nodes[pos];

            if phase == 1 {
                color[pos] = 2;
                continue;
            }

            match color[pos] {
                0 => {}
                1 => return Err(TreeValidationError::CycleDetected { node: node.id }),
                _ => return Err(TreeValidationError::DuplicateVisit { node: node.id }),
            }

            color[pos] = 1;
            order.push(pos);
            depth = depth.max(level);
            stack.push((pos, 1, level));

            if let NodeKind::Internal(split) = node.kind {
                if split.yes == node.id || split.no == node.id {
                    return Err(TreeValidationError::SelfLoop { node: node.id });
                }
                if split.missing != split.yes && split.missing != split.no {
                    return Err(TreeValidationError::InvalidMissingChild {
                        node: node.id,
                        missing: split.missing,
                        yes: split.yes,
                        no: split.no,
                    });
                }

                let yes = self.child(node.id, "yes", split.yes)?;
                let no = self.child(node.id, "no", split.no)?;

                // Push `no` first so `yes` is laid out right after its parent.
                stack.push((no, 0, level + 1));
                stack.push((yes, 0, level + 1));
            }
        }

        if let Some(pos) = color.iter().position(|&c| c == 0) {
            return Err(TreeValidationError::UnreachableNode {
                node: self.nodes[pos].id,
            });
        }

        let mut dense_of_pos = vec![0u32; n_nodes];
        for (dense, &pos) in order.iter().enumerate() {
            dense_of_pos[pos] = dense as u32;
        }
        let dense_nodes: Vec<Node> = order.iter().map(|&pos| self.nodes[pos]).collect();
        let position = &self.position;

        Ok(Tree::from_dense_nodes(
            &dense_nodes,
            |id| dense_of_pos[position[&id]],
            depth,
        ))
    }

    fn child(
        &self,
        node: NodeId,
        side: &'static str,
        child: NodeId,
    ) -> Result<usize, TreeValidationError> {
        self.position
            .get(&child)
            .copied()
            .ok_or(TreeValidationError::UndefinedChild { node, side, child })
    }
}
