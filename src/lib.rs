//! # hexz
//!
//! Server core for hexz, a two-player area-capture game on a hexagonal board.
//!
//! ## Design Principles
//!
//! 1. **One writer per game**: every running game is owned by a single
//!    tokio task. Clients only ever send it messages.
//!
//! 2. **Hidden information**: moves stay hidden from the opponent until the
//!    next reveal. Every viewer gets a board masked for its own role, and
//!    move search only ever sees the requester's masked board.
//!
//! 3. **Forkable engines**: engines clone cheaply and carry their own
//!    random stream, so MCTS playouts never share state with the live game.
//!
//! ## Modules
//!
//! - `core`: player ids and per-player storage, RNG, configuration, errors
//! - `board`: cells, the jagged hex grid, neighbors and flood fill
//! - `rules`: the `GameEngine` contract and moves
//! - `games`: the classic rules and the freeform sandbox
//! - `mcts`: Monte Carlo Tree Search for move suggestions
//! - `master`: game master actors and the game registry

pub mod core;
pub mod board;
pub mod rules;
pub mod games;
pub mod mcts;
pub mod master;

// Re-export commonly used types
pub use crate::core::{opponent, GameRng, HexzConfig, HexzError, PlayerId, PlayerMap, Result};

pub use crate::board::{Board, Cell, CellType, GameState, Pos, ResourceInfo};

pub use crate::rules::{new_engine, GameEngine, GameType, Move, MoveError, SearchableGame};

pub use crate::games::{ClassicGame, FreeformGame};

pub use crate::mcts::{MCTSConfig, MCTSSearch, SearchError, SearchStats};

pub use crate::master::{
    GameHandle, GameId, GameInfo, GameRegistry,
    MasterConfig, RegistryConfig,
    MoveRequest, Registration, ServerEvent, SuggestResponse,
};
