//! The hexagonal board.
//!
//! Rows alternate between `FIRST_ROW_LEN` and `FIRST_ROW_LEN - 1` cells. Odd
//! rows are shifted half a cell to the right, so the neighbors above and
//! below a cell depend on the row's parity:
//!
//! ```text
//!  0 1 2 3      row 0
//!   0 1 2       row 1
//!  0 1 2 3      row 2
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::cell::{Cell, ResourceInfo};
use crate::core::PlayerMap;

/// Number of rows on the board.
pub const NUM_ROWS: usize = 11;

/// Length of the first (and every even) row.
pub const FIRST_ROW_LEN: usize = 10;

/// Total number of cells.
pub const NUM_CELLS: usize =
    FIRST_ROW_LEN * NUM_ROWS.div_ceil(2) + (FIRST_ROW_LEN - 1) * (NUM_ROWS / 2);

/// A (row, column) position. Signed so neighbor arithmetic can step off the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Up to six neighbors, stored inline.
pub type Neighbors = SmallVec<[Pos; 6]>;

/// Lifecycle of a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    #[default]
    Initial,
    Running,
    Finished,
}

/// Complete board state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Player number whose turn it is.
    pub turn: u8,

    /// Move counter.
    #[serde(rename = "move")]
    pub move_num: u32,

    /// Move counter at the last reveal cycle.
    #[serde(skip)]
    pub last_revealed: u32,

    /// Cells, row by row.
    pub fields: Vec<Vec<Cell>>,

    pub score: PlayerMap<u32>,
    pub resources: PlayerMap<ResourceInfo>,
    pub state: GameState,
}

impl Board {
    /// An empty board for `num_players`, each starting with `resources`.
    #[must_use]
    pub fn new(num_players: usize, resources: ResourceInfo) -> Self {
        let fields = (0..NUM_ROWS)
            .map(|r| vec![Cell::default(); FIRST_ROW_LEN - r % 2])
            .collect();

        Self {
            turn: 1,
            move_num: 0,
            last_revealed: 0,
            fields,
            score: PlayerMap::with_value(num_players, 0),
            resources: PlayerMap::with_value(num_players, resources),
            state: GameState::Initial,
        }
    }

    /// Number of players the board keeps score for.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.score.player_count()
    }

    /// Inside the jagged bounds.
    #[inline]
    #[must_use]
    pub fn valid(&self, p: Pos) -> bool {
        p.row >= 0
            && (p.row as usize) < self.fields.len()
            && p.col >= 0
            && (p.col as usize) < self.fields[p.row as usize].len()
    }

    /// Valid hex neighbors of `p`.
    #[must_use]
    pub fn neighbors(&self, p: Pos) -> Neighbors {
        let shift = p.row & 1;
        let (r, c) = (p.row, p.col);
        [
            Pos::new(r, c + 1),
            Pos::new(r - 1, c + shift),
            Pos::new(r - 1, c - 1 + shift),
            Pos::new(r, c - 1),
            Pos::new(r + 1, c - 1 + shift),
            Pos::new(r + 1, c + shift),
        ]
        .into_iter()
        .filter(|&n| self.valid(n))
        .collect()
    }

    /// Visit the region around `start`.
    ///
    /// `visit` is called for every reached cell; only cells for which it
    /// returns true have their neighbors explored. The callback is responsible
    /// for marking cells so they are not expanded twice.
    pub fn flood_fill(&self, start: Pos, mut visit: impl FnMut(Pos) -> bool) {
        let mut stack: Vec<Pos> = vec![start];
        while let Some(p) = stack.pop() {
            if visit(p) {
                stack.extend(self.neighbors(p));
            }
        }
    }

    /// Cell at a valid position. Panics when `p` is off the board.
    #[inline]
    #[must_use]
    pub fn cell(&self, p: Pos) -> &Cell {
        &self.fields[p.row as usize][p.col as usize]
    }

    /// Mutable cell at a valid position.
    #[inline]
    pub fn cell_mut(&mut self, p: Pos) -> &mut Cell {
        &mut self.fields[p.row as usize][p.col as usize]
    }

    /// Every (position, cell) pair, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
        self.fields.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (Pos::new(r as i32, c as i32), cell))
        })
    }

    /// Every cell, mutably.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.fields.iter_mut().flatten()
    }

    /// Total number of cells.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.fields.iter().map(Vec::len).sum()
    }

    /// A board-shaped grid filled with `value`.
    #[must_use]
    pub fn shaped<T: Clone>(&self, value: T) -> Vec<Vec<T>> {
        self.fields.iter().map(|row| vec![value.clone(); row.len()]).collect()
    }

    /// Next player number, wrapping after player 2.
    pub fn advance_turn(&mut self) {
        self.turn = if self.turn >= 2 { 1 } else { self.turn + 1 };
    }

    /// What `role` is allowed to see.
    ///
    /// Hidden cells of other players turn into empty cells. Role 0
    /// (spectator) sees no hidden cells at all.
    #[must_use]
    pub fn masked_for(&self, role: u8) -> Board {
        let mut masked = self.clone();
        for cell in masked.cells_mut() {
            if cell.hidden && (role == 0 || cell.owner != role) {
                let (value, blocked) = (cell.value, cell.blocked);
                *cell = Cell {
                    value,
                    blocked,
                    ..Cell::default()
                };
            }
        }
        masked
    }
}
