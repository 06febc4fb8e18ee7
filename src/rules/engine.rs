//! Game engine traits for the hexz variants.
//!
//! Variants implement `GameEngine` to define their rules:
//! - Which moves are legal
//! - How a move changes the board
//! - When the game ends and who won
//!
//! Engines that can be searched by MCTS additionally implement
//! `SearchableGame`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, CellType, GameState, Pos, ResourceInfo};
use crate::core::GameRng;
use crate::games::{ClassicGame, FreeformGame};

/// A single move request, already attributed to a player number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub player: u8,
    pub row: i32,
    pub col: i32,
    #[serde(rename = "type")]
    pub cell_type: CellType,
}

impl Move {
    #[must_use]
    pub const fn new(player: u8, pos: Pos, cell_type: CellType) -> Self {
        Self {
            player,
            row: pos.row,
            col: pos.col,
            cell_type,
        }
    }

    /// A normal piece at `pos`.
    #[must_use]
    pub const fn normal(player: u8, pos: Pos) -> Self {
        Self::new(player, pos, CellType::Normal)
    }

    #[must_use]
    pub const fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{} {:?}@{}", self.player, self.cell_type, self.pos())
    }
}

/// Why a move was rejected. The board is untouched in every case.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("Game already finished")]
    Finished,
    #[error("Not player {player}'s turn (turn: {turn})")]
    NotYourTurn { player: u8, turn: u8 },
    #[error("Position {0} is off the board")]
    OutOfBounds(Pos),
    #[error("{0:?} cannot be placed")]
    NotPlaceable(CellType),
    #[error("No {0:?} pieces left")]
    NoPiecesLeft(CellType),
    #[error("Position {0} is already occupied")]
    Occupied(Pos),
}

/// The game variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Two-player competitive game.
    #[default]
    Classic,
    /// Single-player sandbox without rules.
    Freeform,
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GameType::Classic => "classic",
            GameType::Freeform => "freeform",
        })
    }
}

impl std::str::FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classic" => Ok(GameType::Classic),
            "freeform" => Ok(GameType::Freeform),
            other => Err(format!("unknown game type {other:?}")),
        }
    }
}

/// Rules of one game variant, bound to the board it owns.
///
/// ## Implementation Notes
///
/// - `make_move`: must be deterministic for a given board and move, and must
///   leave the board untouched when it returns an error
/// - `winner`: only meaningful once `is_done` is true; 0 means draw
pub trait GameEngine: Send {
    /// The variant this engine implements.
    fn game_type(&self) -> GameType;

    /// Seats this variant needs before it starts.
    fn num_players(&self) -> usize;

    /// Pieces each player starts with.
    fn initial_resources(&self) -> ResourceInfo;

    /// Move from `Initial` to `Running`.
    fn start(&mut self);

    /// Back to a fresh `Initial` board.
    fn reset(&mut self);

    /// Validate and apply one move.
    fn make_move(&mut self, m: Move) -> Result<(), MoveError>;

    /// The board.
    fn board(&self) -> &Board;

    /// The game is over.
    fn is_done(&self) -> bool;

    /// Winning player number, 0 for a draw or an unfinished game.
    fn winner(&self) -> u8;

    // === Convenience Methods ===

    /// Shorthand for the board's lifecycle state.
    fn state(&self) -> GameState {
        self.board().state
    }
}

/// The narrow contract MCTS needs from an engine.
pub trait SearchableGame: GameEngine + Sized {
    /// Clone this engine, giving the copy its own random stream.
    fn fork(&self, rng: GameRng) -> Self;

    /// A uniformly random legal move for the side to move.
    ///
    /// Returns `None` when there is no legal move.
    fn random_move(&mut self) -> Option<Move>;
}

/// Create an engine for `game_type`, ready to be started.
#[must_use]
pub fn new_engine(game_type: GameType) -> Box<dyn GameEngine> {
    match game_type {
        GameType::Classic => Box::new(ClassicGame::new(GameRng::from_entropy())),
        GameType::Freeform => Box::new(FreeformGame::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_type_parse() {
        assert_eq!("classic".parse::<GameType>().unwrap(), GameType::Classic);
        assert_eq!("freeform".parse::<GameType>().unwrap(), GameType::Freeform);
        assert!("flagz".parse::<GameType>().is_err());
        assert_eq!(GameType::Freeform.to_string(), "freeform");
    }

    #[test]
    fn test_new_engine_dispatch() {
        let classic = new_engine(GameType::Classic);
        assert_eq!(classic.game_type(), GameType::Classic);
        assert_eq!(classic.num_players(), 2);
        assert_eq!(classic.state(), GameState::Initial);

        let freeform = new_engine(GameType::Freeform);
        assert_eq!(freeform.num_players(), 1);
        assert!(!freeform.is_done());
    }

    #[test]
    fn test_move_json() {
        let m = Move::new(2, Pos::new(3, 4), CellType::Flag);
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json, serde_json::json!({"player": 2, "row": 3, "col": 4, "type": 5}));
    }
}
