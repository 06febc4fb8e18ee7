//! Classic two-player hexz.
//!
//! Players alternate placing pieces on the shared board:
//! - Pieces stay hidden from the opponent until the next reveal cycle
//! - Claiming a cell the opponent already holds in secret kills the cell
//! - A placement that splits a free region captures the smaller part
//! - Fire, flag, pest and death pieces are limited to one each
//!
//! The game ends when no free or hidden cell is left; the larger territory wins.

mod capture;
mod game;

pub use game::ClassicGame;
