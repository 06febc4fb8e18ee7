//! Board model: the hex grid, its cells, and per-player bookkeeping.
//!
//! Pure data plus invariant-preserving operations. Rules live in `games`.

pub mod cell;
pub mod grid;

pub use cell::{Cell, CellType, ResourceInfo, PERMANENT};
pub use grid::{Board, GameState, Neighbors, Pos, FIRST_ROW_LEN, NUM_CELLS, NUM_ROWS};
