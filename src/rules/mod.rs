//! Game engine contract.
//!
//! `GameEngine` is what the game master drives; `SearchableGame` is the
//! narrower view MCTS uses. Concrete rules live in `games`.

mod engine;

pub use engine::{new_engine, GameEngine, GameType, Move, MoveError, SearchableGame};
