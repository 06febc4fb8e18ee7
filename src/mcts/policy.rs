//! MCTS policies for candidate generation, selection, and rewards.
//!
//! - `candidate_moves`: which moves a node is expanded with
//! - `SelectionPolicy`: which child to descend into (UCT by default)
//! - `reward`: what a finished playout is worth to a node

use crate::board::{Board, CellType};
use crate::core::{opponent, GameRng};
use crate::rules::Move;

use super::config::MCTSConfig;
use super::node::NodeId;
use super::tree::MCTSTree;

// =============================================================================
// Candidate Generation
// =============================================================================

/// Uniform sample of at most `capacity` items from a stream of unknown length
/// (Algorithm R).
#[derive(Clone, Debug)]
pub struct Reservoir<T> {
    items: Vec<T>,
    capacity: usize,
    seen: usize,
}

impl<T> Reservoir<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            seen: 0,
        }
    }

    /// Offer the next item of the stream.
    pub fn offer(&mut self, item: T, rng: &mut GameRng) {
        if self.capacity == 0 {
            return;
        }
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(item);
        } else {
            let j = rng.gen_index(self.seen);
            if j < self.capacity {
                self.items[j] = item;
            }
        }
    }

    /// Items offered so far.
    #[must_use]
    pub fn seen(&self) -> usize {
        self.seen
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Moves a node for `board.turn` is expanded with.
///
/// Every free cell available to the mover is a normal move. A mover still
/// holding a flag additionally gets up to `max_flag_positions` flag moves on
/// uniformly sampled free cells; with `flags_first` those are the only
/// candidates. Once no free cell is left, the opponent's hidden cells are
/// offered instead.
pub fn candidate_moves(board: &Board, config: &MCTSConfig, rng: &mut GameRng) -> Vec<Move> {
    let turn = board.turn;
    let has_flag = board
        .resources
        .try_get(turn)
        .is_some_and(|r| r.has(CellType::Flag));
    let mut normals = Vec::with_capacity(board.num_cells());
    let mut flags = Reservoir::new(if has_flag { config.max_flag_positions } else { 0 });

    for (pos, cell) in board.cells() {
        if cell.occupied() || !cell.is_avail(turn) {
            continue;
        }
        normals.push(Move::normal(turn, pos));
        flags.offer(Move::new(turn, pos, CellType::Flag), rng);
    }

    if normals.is_empty() {
        let opp = opponent(turn);
        return board
            .cells()
            .filter(|(_, c)| c.hidden && c.owner == opp)
            .map(|(pos, _)| Move::normal(turn, pos))
            .collect();
    }

    let flags = flags.into_vec();
    if flags.is_empty() {
        normals
    } else if config.flags_first {
        flags
    } else {
        normals.extend(flags);
        normals
    }
}

// =============================================================================
// Selection Policy
// =============================================================================

/// Policy for selecting which child node to explore.
pub trait SelectionPolicy: Send + Sync {
    /// Select a child of `node` that is not done yet.
    ///
    /// Returns `None` if every child is done.
    fn select(&self, tree: &MCTSTree, node: NodeId, config: &MCTSConfig) -> Option<NodeId>;
}

/// UCT selection: win ratio plus an exploration bonus.
///
/// Formula: Q + c * sqrt(ln(N) / n). Unvisited children come first; ties go
/// to the earlier child.
#[derive(Clone, Debug, Default)]
pub struct UCT;

impl SelectionPolicy for UCT {
    fn select(&self, tree: &MCTSTree, node: NodeId, config: &MCTSConfig) -> Option<NodeId> {
        let parent_visits = tree.get(node).visits;
        let mut best: Option<(NodeId, f64)> = None;
        for &child in tree.children(node) {
            let c = tree.get(child);
            if c.done {
                continue;
            }
            let u = c.u(parent_visits, config.exploration_constant);
            if best.map_or(true, |(_, max)| u > max) {
                best = Some((child, u));
            }
        }
        best.map(|(id, _)| id)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Playout result from the point of view of the player who moved into a node.
#[must_use]
pub fn reward(turn: u8, winner: u8) -> f64 {
    if winner == 0 {
        0.5
    } else if turn == winner {
        1.0
    } else {
        0.0
    }
}
