//! Classic game implementation.

use crate::board::{Board, Cell, CellType, GameState, Pos, ResourceInfo};
use crate::core::{opponent, GameRng, PlayerMap};
use crate::rules::{GameEngine, GameType, Move, MoveError, SearchableGame};

use super::capture::{apply_fire, occupy_fields, reveal};

/// Moves between forced reveal cycles.
const REVEAL_INTERVAL: u32 = 4;

/// Two-player classic hexz.
#[derive(Clone, Debug)]
pub struct ClassicGame {
    board: Board,
    rng: GameRng,
}

impl ClassicGame {
    /// A fresh game in the `Initial` state.
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self {
            board: Board::new(2, Self::resources()),
            rng,
        }
    }

    /// Convenience constructor with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(GameRng::new(seed))
    }

    /// Continue from an existing position, e.g. a masked player view.
    #[must_use]
    pub fn from_board(board: Board, rng: GameRng) -> Self {
        Self { board, rng }
    }

    /// Pieces each player starts with: unlimited normals, one of each special.
    #[must_use]
    pub fn resources() -> ResourceInfo {
        ResourceInfo::empty()
            .with(CellType::Normal, -1)
            .with(CellType::Fire, 1)
            .with(CellType::Flag, 1)
            .with(CellType::Pest, 1)
            .with(CellType::Death, 1)
    }

    fn check(&self, m: &Move) -> Result<(), MoveError> {
        let board = &self.board;
        if board.state == GameState::Finished {
            return Err(MoveError::Finished);
        }
        if m.player != board.turn {
            return Err(MoveError::NotYourTurn {
                player: m.player,
                turn: board.turn,
            });
        }
        let pos = m.pos();
        if !board.valid(pos) {
            return Err(MoveError::OutOfBounds(pos));
        }
        if m.cell_type == CellType::Dead {
            return Err(MoveError::NotPlaceable(m.cell_type));
        }
        if m.cell_type != CellType::Normal && !board.resources[m.player].has(m.cell_type) {
            return Err(MoveError::NoPiecesLeft(m.cell_type));
        }
        Ok(())
    }

    /// Score revealed cells and finish once nothing is left to play.
    fn update_score(&mut self) {
        let mut score = PlayerMap::with_value(2, 0u32);
        let mut open = 0;
        for (_, cell) in self.board.cells() {
            if !cell.hidden {
                if let Some(s) = score.try_get_mut(cell.owner) {
                    *s += 1;
                }
            }
            if !cell.occupied() || cell.hidden {
                open += 1;
            }
        }
        self.board.score = score;
        if open == 0 {
            self.board.state = GameState::Finished;
        }
    }
}

impl GameEngine for ClassicGame {
    fn game_type(&self) -> GameType {
        GameType::Classic
    }

    fn num_players(&self) -> usize {
        2
    }

    fn initial_resources(&self) -> ResourceInfo {
        Self::resources()
    }

    fn start(&mut self) {
        if self.board.state == GameState::Initial {
            self.board.state = GameState::Running;
        }
    }

    fn reset(&mut self) {
        self.board = Board::new(self.num_players(), self.initial_resources());
    }

    fn make_move(&mut self, m: Move) -> Result<(), MoveError> {
        self.check(&m)?;

        let turn = m.player;
        let pos = m.pos();
        let board = &mut self.board;
        let mut must_reveal = m.cell_type.reveals_immediately();
        let mut num_occupied = 0;

        let target = *board.cell(pos);
        if target.occupied() {
            if target.hidden && target.owner == opponent(turn) {
                // Both players claimed the cell: it collapses for good.
                board.move_num += 1;
                *board.cell_mut(pos) = Cell {
                    value: target.value,
                    blocked: target.blocked,
                    ..Cell::dead()
                };
                must_reveal = true;
            } else if m.cell_type == CellType::Death {
                let cell = board.cell_mut(pos);
                cell.owner = turn;
                cell.cell_type = CellType::Death;
                cell.hidden = false;
                cell.lifetime = CellType::Death.lifetime();
            } else {
                return Err(MoveError::Occupied(pos));
            }
        } else {
            board.move_num += 1;
            if m.cell_type == CellType::Fire {
                let cell = board.cell_mut(pos);
                cell.owner = turn;
                cell.cell_type = CellType::Fire;
                cell.lifetime = CellType::Fire.lifetime();
                apply_fire(board, pos);
            } else {
                num_occupied = occupy_fields(board, turn, pos, m.cell_type);
            }
        }

        if m.cell_type != CellType::Normal {
            board.resources[turn].consume(m.cell_type);
        }
        board.advance_turn();

        if num_occupied > 1 || board.move_num - board.last_revealed == REVEAL_INTERVAL || must_reveal {
            reveal(board);
        }
        self.update_score();
        Ok(())
    }

    fn board(&self) -> &Board {
        &self.board
    }

    fn is_done(&self) -> bool {
        self.board.state == GameState::Finished
    }

    fn winner(&self) -> u8 {
        if !self.is_done() {
            return 0;
        }
        let best = self.board.score.iter().map(|(_, &s)| s).max().unwrap_or(0);
        let mut leaders = self.board.score.iter().filter(|&(_, &s)| s == best);
        match (leaders.next(), leaders.next()) {
            (Some((p, _)), None) => p,
            _ => 0,
        }
    }
}

impl SearchableGame for ClassicGame {
    fn fork(&self, rng: GameRng) -> Self {
        Self {
            board: self.board.clone(),
            rng,
        }
    }

    fn random_move(&mut self) -> Option<Move> {
        let turn = self.board.turn;
        let mut targets: Vec<Pos> = self
            .board
            .cells()
            .filter(|(_, c)| !c.occupied() && c.is_avail(turn))
            .map(|(p, _)| p)
            .collect();
        if targets.is_empty() {
            // Only hidden opponent cells are left; playing one forces a conflict.
            let opp = opponent(turn);
            targets = self
                .board
                .cells()
                .filter(|(_, c)| c.hidden && c.owner == opp)
                .map(|(p, _)| p)
                .collect();
        }
        self.rng.choose(&targets).map(|&p| Move::normal(turn, p))
    }
}
