use crate::board::{Board, GameState, ResourceInfo};
use crate::rules::{GameEngine, GameType, Move, MoveError};

/// Freeform sandbox engine. The turn still alternates between 1 and 2 so
/// both colors can be painted.
#[derive(Clone, Debug)]
pub struct FreeformGame {
    board: Board,
}

impl FreeformGame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::new(1, ResourceInfo::unlimited()),
        }
    }
}

impl Default for FreeformGame {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine for FreeformGame {
    fn game_type(&self) -> GameType {
        GameType::Freeform
    }

    fn num_players(&self) -> usize {
        1
    }

    fn initial_resources(&self) -> ResourceInfo {
        ResourceInfo::unlimited()
    }

    fn start(&mut self) {
        self.board.state = GameState::Running;
    }

    fn reset(&mut self) {
        self.board = Board::new(self.num_players(), self.initial_resources());
    }

    fn make_move(&mut self, m: Move) -> Result<(), MoveError> {
        let pos = m.pos();
        if !self.board.valid(pos) {
            return Err(MoveError::OutOfBounds(pos));
        }
        let turn = self.board.turn;
        self.board.move_num += 1;
        let cell = self.board.cell_mut(pos);
        cell.owner = turn;
        cell.cell_type = m.cell_type;
        self.board.advance_turn();
        Ok(())
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn is_done(&self) -> bool {
        false
    }

    fn winner(&self) -> u8 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CellType, Pos};

    #[test]
    fn test_paints_any_cell() {
        let mut g = FreeformGame::new();
        g.start();
        g.make_move(Move::new(1, Pos::new(0, 0), CellType::Rock))
            .unwrap();
        // Overwriting is fine, and the player in the move is ignored.
        g.make_move(Move::new(1, Pos::new(0, 0), CellType::Fire))
            .unwrap();

        let b = g.board();
        let cell = b.cell(Pos::new(0, 0));
        assert_eq!(cell.cell_type, CellType::Fire);
        assert_eq!(cell.owner, 2);
        assert_eq!(b.move_num, 2);
        assert_eq!(b.turn, 1);
        assert!(!g.is_done());
        assert_eq!(g.winner(), 0);
    }

    #[test]
    fn test_rejects_off_board() {
        let mut g = FreeformGame::new();
        assert_eq!(
            g.make_move(Move::normal(1, Pos::new(10, 10))),
            Err(MoveError::OutOfBounds(Pos::new(10, 10)))
        );
        assert_eq!(g.board().move_num, 0);
    }

    #[test]
    fn test_reset() {
        let mut g = FreeformGame::new();
        g.start();
        g.make_move(Move::normal(1, Pos::new(3, 3))).unwrap();
        g.reset();
        assert_eq!(g.state(), GameState::Initial);
        assert!(!g.board().cell(Pos::new(3, 3)).occupied());
        assert_eq!(g.board().num_players(), 1);
    }
}
