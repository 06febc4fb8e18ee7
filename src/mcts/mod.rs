//! Monte Carlo Tree Search for hexz.
//!
//! ## Overview
//!
//! Plain UCT search with random playouts, used to suggest moves:
//!
//! - **Engine forks**: every iteration works on a fork of the engine with its
//!   own random stream; the engine passed in is never touched
//! - **Done tracking**: fully played-out subtrees are pruned from selection,
//!   and the search ends early when the whole game tree is explored
//! - **Flag sampling**: flag moves are offered on a small uniform sample of
//!   free cells instead of on every cell
//! - **Time budget**: the clock is checked every `budget_check_interval`
//!   iterations
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use hexz::games::ClassicGame;
//! use hexz::mcts::{MCTSConfig, MCTSSearch};
//! use hexz::rules::GameEngine;
//!
//! let mut game = ClassicGame::with_seed(1);
//! game.start();
//!
//! let mut search = MCTSSearch::new(MCTSConfig::default().with_seed(7));
//! let (mv, stats) = search.suggest_move(&game, Duration::from_millis(10)).unwrap();
//!
//! assert_eq!(mv.player, 1);
//! println!("{stats}");
//! ```

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::MCTSConfig;
pub use node::{MCTSNode, NodeId};
pub use policy::{candidate_moves, reward, Reservoir, SelectionPolicy, UCT};
pub use search::{MCTSSearch, SearchError};
pub use stats::{MoveStats, SearchStats};
pub use tree::{MCTSTree, TreeStats};
