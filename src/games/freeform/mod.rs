//! Freeform single-player sandbox.
//!
//! No captures, no hidden cells, no end. Useful for trying out the board.

mod game;

pub use game::FreeformGame;
