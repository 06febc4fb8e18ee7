//! Events pushed to viewers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, GameState, ResourceInfo};

/// What one viewer sees of the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub turn: u8,
    #[serde(rename = "move")]
    pub move_num: u32,
    pub fields: Vec<Vec<Cell>>,
    pub score: Vec<u32>,
    pub resources: Vec<ResourceInfo>,
    pub state: GameState,
}

impl BoardView {
    /// The board as `role` may see it. Other players' hidden cells are blanked.
    #[must_use]
    pub fn for_role(board: &Board, role: u8) -> Self {
        let masked = board.masked_for(role);
        Self {
            turn: masked.turn,
            move_num: masked.move_num,
            fields: masked.fields,
            score: masked.score.as_slice().to_vec(),
            resources: masked.resources.as_slice().to_vec(),
            state: masked.state,
        }
    }
}

/// One message on a viewer's event stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvent {
    /// When the event was sent.
    pub timestamp: DateTime<Utc>,

    /// Board snapshot; absent on heartbeats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<BoardView>,

    /// The receiver's player number, 0 for spectators.
    pub role: u8,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub announcements: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub debug_message: String,

    /// Winning player number once the game is over; 0 is omitted.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub winner: u8,

    /// The stream ends after this event.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub last_event: bool,

    /// Ids of recently started games, sent with heartbeats.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_games: Vec<String>,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

impl ServerEvent {
    /// An empty event for `role`, stamped now.
    #[must_use]
    pub fn new(role: u8) -> Self {
        Self {
            timestamp: Utc::now(),
            board: None,
            role,
            announcements: Vec::new(),
            debug_message: String::new(),
            winner: 0,
            last_event: false,
            active_games: Vec::new(),
        }
    }

    /// An event carrying `role`'s view of `board`.
    #[must_use]
    pub fn snapshot(board: &Board, role: u8) -> Self {
        Self {
            board: Some(BoardView::for_role(board, role)),
            ..Self::new(role)
        }
    }

    #[must_use]
    pub fn with_announcement(mut self, text: impl Into<String>) -> Self {
        self.announcements.push(text.into());
        self
    }

    #[must_use]
    pub fn with_winner(mut self, winner: u8) -> Self {
        self.winner = winner;
        self
    }

    #[must_use]
    pub fn with_active_games(mut self, ids: Vec<String>) -> Self {
        self.active_games = ids;
        self
    }

    #[must_use]
    pub fn last(mut self) -> Self {
        self.last_event = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CellType, Pos};

    #[test]
    fn test_heartbeat_json_is_sparse() {
        let event = ServerEvent::new(0).with_active_games(vec!["abc".into()]);
        let json = serde_json::to_value(&event).unwrap();
        let obj = json.as_object().unwrap();

        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["activeGames", "role", "timestamp"]);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_snapshot_masks_hidden_cells() {
        let mut board = Board::new(2, ResourceInfo::unlimited());
        *board.cell_mut(Pos::new(2, 2)) = Cell {
            hidden: true,
            ..Cell::owned(1, CellType::Normal)
        };

        let own = ServerEvent::snapshot(&board, 1);
        let other = ServerEvent::snapshot(&board, 2);

        assert_eq!(own.board.unwrap().fields[2][2].owner, 1);
        assert_eq!(other.board.unwrap().fields[2][2].owner, 0);
    }

    #[test]
    fn test_final_event_json() {
        let board = Board::new(2, ResourceInfo::empty());
        let event = ServerEvent::snapshot(&board, 2)
            .with_winner(2)
            .with_announcement("Player 2 won")
            .last();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["winner"], 2);
        assert_eq!(json["lastEvent"], true);
        assert_eq!(json["announcements"][0], "Player 2 won");
        assert_eq!(json["board"]["move"], 0);
        assert_eq!(json["board"]["state"], "initial");

        let back: ServerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
