use thiserror::Error;

use crate::mcts::SearchError;

/// Errors surfaced at the crate boundary.
///
/// Rejected moves never show up here: the game master drops them.
#[derive(Error, Debug)]
pub enum HexzError {
    #[error("Game {0} does not exist")]
    GameNotFound(String),
    #[error("Game {0} is no longer running")]
    GameClosed(String),
    #[error("No free game id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },
    #[error("Player {0} has no seat in this game")]
    NotSeated(String),
    #[error("Player {player} cannot ask for a move on player {turn}'s turn")]
    NotYourTurn { player: u8, turn: u8 },
    #[error("Move suggestions are only available for classic games")]
    SuggestUnsupported,
    #[error("Move search failed: {0}")]
    Search(#[from] SearchError),
    #[error("Search worker failed: {0}")]
    SearchWorker(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, HexzError>;
