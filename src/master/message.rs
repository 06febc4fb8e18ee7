//! Control messages accepted by a game master, and their payloads.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use super::event::ServerEvent;
use crate::board::CellType;
use crate::core::{PlayerId, Result};
use crate::mcts::SearchStats;
use crate::rules::Move;

/// A move as requested by a client. The player number comes from the seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub row: i32,
    pub col: i32,
    #[serde(rename = "type", default)]
    pub cell_type: CellType,
    /// Move number the client saw; the move is dropped if the board moved on.
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub move_num: Option<u32>,
}

impl MoveRequest {
    #[must_use]
    pub const fn new(row: i32, col: i32, cell_type: CellType) -> Self {
        Self {
            row,
            col,
            cell_type,
            move_num: None,
        }
    }

    /// Only apply the move if the board is at move `move_num`.
    #[must_use]
    pub const fn at_move(mut self, move_num: u32) -> Self {
        self.move_num = Some(move_num);
        self
    }
}

/// Result of joining a game.
#[derive(Debug)]
pub struct Registration {
    /// Player number, 0 for spectators.
    pub role: u8,
    /// Identifies this registration. A later registration of the same player
    /// gets a higher number.
    pub generation: u64,
    /// The viewer's event stream, starting with a snapshot.
    pub events: mpsc::Receiver<ServerEvent>,
}

/// A suggested move and how it was found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    #[serde(rename = "move")]
    pub mv: Move,
    pub stats: SearchStats,
}

/// Messages on a game master's control channel.
#[derive(Debug)]
pub enum ControlMessage {
    /// Join as player or spectator.
    Register {
        player_id: PlayerId,
        reply: oneshot::Sender<Registration>,
    },
    /// Leave. Seated players keep their seat for the grace period.
    ///
    /// With a `generation`, the message only applies to that registration
    /// and is dropped once the player has registered again.
    Unregister {
        player_id: PlayerId,
        generation: Option<u64>,
    },
    /// Play a move.
    Move {
        player_id: PlayerId,
        request: MoveRequest,
    },
    /// Start over.
    Reset { player_id: PlayerId },
    /// Ask the AI for a move.
    Suggest {
        player_id: PlayerId,
        /// `None` uses the configured default.
        budget: Option<Duration>,
        reply: oneshot::Sender<Result<SuggestResponse>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_request_json() {
        let req: MoveRequest = serde_json::from_str(r#"{"row": 3, "col": 4, "type": 5}"#).unwrap();
        assert_eq!(req, MoveRequest::new(3, 4, CellType::Flag));

        let req: MoveRequest = serde_json::from_str(r#"{"row": 1, "col": 2, "move": 7}"#).unwrap();
        assert_eq!(req, MoveRequest::new(1, 2, CellType::Normal).at_move(7));

        let json = serde_json::to_value(MoveRequest::new(0, 0, CellType::Normal)).unwrap();
        assert!(json.get("move").is_none());
    }
}
