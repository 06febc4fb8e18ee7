//! Arena-based MCTS tree.
//!
//! Uses a flat `Vec<MCTSNode>` with index-based references for efficiency,
//! cache-friendliness, and serializability.

use serde::{Deserialize, Serialize};

use super::node::{MCTSNode, NodeId};
use crate::rules::Move;

/// Arena-based MCTS tree.
///
/// Nodes are stored in a flat vector and referenced by `NodeId` indices.
/// The root is always `NodeId(0)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSTree {
    nodes: Vec<MCTSNode>,
}

impl MCTSTree {
    /// Create a new tree whose root has `turn` to move.
    #[must_use]
    pub fn new(turn: u8) -> Self {
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(MCTSNode::root(turn));
        Self { nodes }
    }

    /// Get the root node ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node, returning its ID.
    pub fn alloc(&mut self, node: MCTSNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Expand `parent` with one child per move. All children start live.
    pub fn expand(&mut self, parent: NodeId, moves: impl IntoIterator<Item = Move>) {
        let depth = self.get(parent).depth + 1;
        let children: Vec<NodeId> = moves
            .into_iter()
            .map(|m| self.alloc(MCTSNode::new(m, depth)))
            .collect();
        let node = self.get_mut(parent);
        node.live_children = children.len();
        node.children = Some(children);
    }

    /// Children of `id`; empty before expansion.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).children.as_deref().unwrap_or(&[])
    }

    /// Record that `child` of `parent` is done; the parent becomes done with
    /// its last live child.
    pub fn mark_done(&mut self, parent: NodeId, child: NodeId) {
        self.get_mut(child).done = true;
        let node = self.get_mut(parent);
        node.live_children = node.live_children.saturating_sub(1);
        if node.live_children == 0 {
            node.done = true;
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    #[must_use]
    pub fn root_node(&self) -> &MCTSNode {
        self.get(self.root())
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            node_count: self.nodes.len(),
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            expanded_count: self.nodes.iter().filter(|n| n.is_expanded()).count(),
            done_count: self.nodes.iter().filter(|n| n.done).count(),
        }
    }
}

/// Statistics about the MCTS tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    /// Total number of nodes.
    pub node_count: usize,

    /// Maximum depth reached.
    pub max_depth: u16,

    /// Nodes whose children have been generated.
    pub expanded_count: usize,

    /// Nodes known to be fully explored.
    pub done_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    fn moves(player: u8, n: i32) -> Vec<Move> {
        (0..n).map(|c| Move::normal(player, Pos::new(0, c))).collect()
    }

    #[test]
    fn test_tree_new() {
        let tree = MCTSTree::new(1);

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId::new(0));
        assert_eq!(tree.root_node().turn, 1);
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn test_tree_expand() {
        let mut tree = MCTSTree::new(1);
        let root = tree.root();
        tree.expand(root, moves(1, 3));

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get(root).live_children, 3);
        let children = tree.children(root).to_vec();
        assert_eq!(children, vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)]);
        assert_eq!(tree.get(children[2]).pos, Pos::new(0, 2));
        assert_eq!(tree.get(children[2]).depth, 1);
    }

    #[test]
    fn test_mark_done_propagates_to_parent() {
        let mut tree = MCTSTree::new(1);
        let root = tree.root();
        tree.expand(root, moves(1, 2));
        let children = tree.children(root).to_vec();

        tree.mark_done(root, children[0]);
        assert!(tree.get(children[0]).done);
        assert!(!tree.get(root).done);

        tree.mark_done(root, children[1]);
        assert!(tree.get(root).done);
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MCTSTree::new(1);
        let root = tree.root();
        tree.expand(root, moves(1, 2));
        let child = tree.children(root)[0];
        tree.expand(child, moves(2, 4));

        let stats = tree.stats();
        assert_eq!(stats.node_count, 7);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.expanded_count, 2);
    }

    #[test]
    fn test_tree_serialization() {
        let mut tree = MCTSTree::new(2);
        tree.get_mut(tree.root()).visits = 50;
        tree.expand(tree.root(), moves(2, 1));

        let json = serde_json::to_string(&tree).unwrap();
        let deserialized: MCTSTree = serde_json::from_str(&json).unwrap();

        assert_eq!(tree.len(), deserialized.len());
        assert_eq!(deserialized.root_node().visits, 50);
        assert_eq!(deserialized.children(deserialized.root()).len(), 1);
    }
}
