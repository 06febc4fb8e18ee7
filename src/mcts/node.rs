//! MCTS node structure.
//!
//! Uses arena-based allocation with index references (NodeId) for efficiency
//! and serializability. Each node stands for the move that led to it.

use serde::{Deserialize, Serialize};

use crate::board::{CellType, Pos};
use crate::rules::Move;

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A node in the MCTS tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSNode {
    /// Cell of the move leading here. Unused for the root.
    pub pos: Pos,

    /// Piece of the move leading here.
    pub cell_type: CellType,

    /// Player who made the move leading here; the side to move for the root.
    pub turn: u8,

    /// Depth in tree (root = 0).
    pub depth: u16,

    /// Wins credited to `turn`, draws count half.
    pub wins: f64,

    /// Playouts through this node.
    pub visits: u32,

    /// Children, `None` until the node is expanded.
    pub children: Option<Vec<NodeId>>,

    /// Children not yet fully explored.
    pub live_children: usize,

    /// Every game through this node has been played to the end.
    pub done: bool,
}

impl MCTSNode {
    /// Create a node for `m`.
    #[must_use]
    pub fn new(m: Move, depth: u16) -> Self {
        Self {
            pos: m.pos(),
            cell_type: m.cell_type,
            turn: m.player,
            depth,
            wins: 0.0,
            visits: 0,
            children: None,
            live_children: 0,
            done: false,
        }
    }

    /// Create a root node for the side to move.
    #[must_use]
    pub fn root(turn: u8) -> Self {
        Self::new(Move::normal(turn, Pos::new(0, 0)), 0)
    }

    /// The move this node stands for.
    #[must_use]
    pub fn mv(&self) -> Move {
        Move::new(self.turn, self.pos, self.cell_type)
    }

    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Win ratio; 0 before the first visit.
    #[must_use]
    pub fn q(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / f64::from(self.visits)
        }
    }

    /// UCT score given the parent's visit count; infinite before the first visit.
    #[must_use]
    pub fn u(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let n = f64::from(self.visits);
        self.wins / n + exploration * (f64::from(parent_visits).ln() / n).sqrt()
    }
}
