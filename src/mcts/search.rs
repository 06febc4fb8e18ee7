//! Core MCTS search algorithm.
//!
//! Every iteration forks the engine under search, walks the tree with the
//! selection policy, expands the first unexpanded node it reaches and plays
//! the rest of the game randomly. Nodes whose subtree has been played out
//! completely are marked done and never selected again.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::core::GameRng;
use crate::rules::{Move, MoveError, SearchableGame};

use super::config::MCTSConfig;
use super::node::NodeId;
use super::policy::{candidate_moves, reward, SelectionPolicy, UCT};
use super::stats::{MoveStats, SearchStats};
use super::tree::MCTSTree;

/// Structural failures that abort a search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Cannot search a finished game")]
    GameFinished,
    #[error("No candidate moves at unfinished {0}")]
    NoCandidates(NodeId),
    #[error("No live child under {0}")]
    NoLiveChild(NodeId),
    #[error("Tree move {mv} was rejected: {reason}")]
    IllegalMove { mv: Move, reason: MoveError },
    #[error("Rollout found no move in an unfinished game")]
    RolloutStuck,
}

/// Main MCTS search context.
///
/// Owns the configuration, the random stream, and the tree of the last
/// search. The engine under search is only ever forked, never mutated.
pub struct MCTSSearch {
    /// Search configuration.
    config: MCTSConfig,

    /// Drives candidate sampling, expansion, and engine forks.
    rng: GameRng,

    /// Selection policy.
    selection: Box<dyn SelectionPolicy>,

    /// The tree of the last search.
    tree: MCTSTree,
}

impl MCTSSearch {
    /// Create a new MCTS search context.
    #[must_use]
    pub fn new(config: MCTSConfig) -> Self {
        Self {
            rng: GameRng::from_seed_or_entropy(config.seed),
            config,
            selection: Box::new(UCT),
            tree: MCTSTree::new(1),
        }
    }

    /// Set a custom selection policy.
    #[must_use]
    pub fn with_selection<S: SelectionPolicy + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Search for the best move of the side to move within `budget`.
    ///
    /// Stops early once the whole game tree has been explored. The budget is
    /// checked every `budget_check_interval` iterations, so at least that
    /// many iterations run when the game has enough moves.
    pub fn suggest_move<E: SearchableGame>(
        &mut self,
        game: &E,
        budget: Duration,
    ) -> Result<(Move, SearchStats), SearchError> {
        if game.is_done() {
            return Err(SearchError::GameFinished);
        }

        let started = Instant::now();
        self.tree = MCTSTree::new(game.board().turn);
        let root = self.tree.root();
        let interval = self.config.budget_check_interval.max(1);
        let mut path: Vec<NodeId> = Vec::with_capacity(128);
        let mut max_depth = 0;

        for n in 0u32.. {
            if n > 0 && n % interval == 0 && started.elapsed() >= budget {
                break;
            }
            let mut ge = game.fork(self.rng.fork());
            path.clear();
            path.push(root);
            max_depth = max_depth.max(self.run(&mut ge, &mut path)?);
            if self.tree.get(root).done {
                break;
            }
        }

        let elapsed = started.elapsed();
        let root_node = self.tree.root_node();
        let mut best: Option<NodeId> = None;
        let mut moves = Vec::new();
        for &id in self.tree.children(root) {
            let child = self.tree.get(id);
            if best.map_or(true, |b| child.q() > self.tree.get(b).q()) {
                best = Some(id);
            }
            moves.push(MoveStats {
                row: child.pos.row,
                col: child.pos.col,
                cell_type: child.cell_type,
                visits: child.visits,
                u: child.u(root_node.visits, self.config.exploration_constant),
                q: child.q(),
            });
        }
        let best = best.ok_or(SearchError::NoCandidates(root))?;

        let stats = SearchStats {
            iterations: root_node.visits,
            max_depth,
            tree_size: self.tree.len(),
            elapsed,
            fully_explored: root_node.done,
            moves,
        };
        let mv = self.tree.get(best).mv();
        debug!(
            %mv,
            iterations = stats.iterations,
            tree_size = stats.tree_size,
            fully_explored = stats.fully_explored,
            "Search finished"
        );
        Ok((mv, stats))
    }

    /// One iteration: descend, expand, play out, backpropagate.
    ///
    /// `path` holds the root on entry. Returns the length of the final path.
    fn run<E: SearchableGame>(
        &mut self,
        ge: &mut E,
        path: &mut Vec<NodeId>,
    ) -> Result<usize, SearchError> {
        loop {
            let node = path[path.len() - 1];

            if !self.tree.get(node).is_expanded() {
                let candidates = candidate_moves(ge.board(), &self.config, &mut self.rng);
                if candidates.is_empty() {
                    return Err(SearchError::NoCandidates(node));
                }
                let pick = self.rng.gen_index(candidates.len());
                self.tree.expand(node, candidates);
                let child = self.tree.children(node)[pick];
                let winner = play_random_game(ge, self.tree.get(child).mv())?;
                path.push(child);
                self.backpropagate(path, winner);
                return Ok(path.len());
            }

            let child = self
                .selection
                .select(&self.tree, node, &self.config)
                .ok_or(SearchError::NoLiveChild(node))?;
            let mv = self.tree.get(child).mv();
            apply(ge, mv)?;
            path.push(child);

            if ge.is_done() {
                self.backpropagate(path, ge.winner());
                self.propagate_done(path);
                return Ok(path.len());
            }
        }
    }

    fn backpropagate(&mut self, path: &[NodeId], winner: u8) {
        for &id in path.iter().rev() {
            let node = self.tree.get_mut(id);
            node.wins += reward(node.turn, winner);
            node.visits += 1;
        }
    }

    /// The last node of `path` ended the game. Retire it and every ancestor
    /// left without live children.
    fn propagate_done(&mut self, path: &[NodeId]) {
        for pair in path.windows(2).rev() {
            let (parent, child) = (pair[0], pair[1]);
            let is_leaf = child == path[path.len() - 1];
            if !is_leaf && !self.tree.get(child).done {
                break;
            }
            self.tree.mark_done(parent, child);
        }
    }

    /// Get the tree of the last search.
    #[must_use]
    pub fn tree(&self) -> &MCTSTree {
        &self.tree
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }
}

fn apply<E: SearchableGame>(ge: &mut E, mv: Move) -> Result<(), SearchError> {
    ge.make_move(mv)
        .map_err(|reason| SearchError::IllegalMove { mv, reason })
}

/// Play `first`, then random moves until the game ends.
fn play_random_game<E: SearchableGame>(ge: &mut E, first: Move) -> Result<u8, SearchError> {
    apply(ge, first)?;
    while !ge.is_done() {
        let mv = ge.random_move().ok_or(SearchError::RolloutStuck)?;
        apply(ge, mv)?;
    }
    Ok(ge.winner())
}
