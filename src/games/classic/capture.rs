//! Board effects of the classic game: area capture, fire, pest, reveal.

use crate::board::{Board, CellType, Pos};
use crate::core::opponent;

/// Free region bordering a freshly placed piece.
#[derive(Clone, Copy, Debug, Default)]
struct Area {
    /// Free cells in the region.
    size: usize,
    /// Flags on the boundary, per player.
    flags: [u32; 2],
    /// Dead cells on the boundary.
    dead_cells: u32,
}

impl Area {
    /// Eligible for capture: has free cells and touches no dead cell.
    fn capturable(&self) -> bool {
        self.size > 0 && self.dead_cells == 0
    }
}

/// Place `cell_type` for `player` at the free cell `pos` and capture the
/// smallest region split off by it.
///
/// Returns the number of cells that became occupied, including `pos`.
pub(crate) fn occupy_fields(board: &mut Board, player: u8, pos: Pos, cell_type: CellType) -> usize {
    let placed = board.cell_mut(pos);
    placed.owner = player;
    placed.cell_type = cell_type;
    placed.hidden = true;
    placed.lifetime = cell_type.lifetime();

    // Index of the neighbor whose region a cell was assigned to, -1 if none.
    let mut marks: Vec<Vec<i8>> = board.shaped(-1);
    let mut areas = [Area::default(); 6];
    if cell_type == CellType::Flag {
        // A flag placed here borders every area.
        for area in &mut areas {
            area.flags[player as usize - 1] += 1;
        }
    }

    let ns = board.neighbors(pos);
    for (k, &start) in ns.iter().enumerate() {
        if marks[start.row as usize][start.col as usize] != -1 {
            // Same region as an earlier neighbor.
            continue;
        }
        let k8 = k as i8;
        let area = &mut areas[k];
        board.flood_fill(start, |p| {
            let mark = &mut marks[p.row as usize][p.col as usize];
            if *mark == k8 {
                return false;
            }
            *mark = k8;
            let cell = board.cell(p);
            if cell.occupied() {
                match (cell.cell_type, cell.owner) {
                    (CellType::Flag, owner @ 1..=2) => area.flags[owner as usize - 1] += 1,
                    (CellType::Dead, _) => area.dead_cells += 1,
                    _ => {}
                }
                return false;
            }
            area.size += 1;
            true
        });
    }

    // Several capturable regions means the placement split a region in two.
    let mut num_areas = 0;
    let mut smallest: Option<usize> = None;
    for (k, area) in areas.iter().enumerate().take(ns.len()) {
        if !area.capturable() {
            continue;
        }
        num_areas += 1;
        if smallest.map_or(true, |m| areas[m].size > area.size) {
            smallest = Some(k);
        }
    }

    let mut num_occupied = 1;
    if let Some(k) = smallest.filter(|_| num_areas > 1) {
        let area = areas[k];
        let opp = opponent(player);
        let occupier = if area.flags[opp as usize - 1] > area.flags[player as usize - 1] {
            opp
        } else {
            player
        };
        let k8 = k as i8;
        for (row, marks_row) in board.fields.iter_mut().zip(&marks) {
            for (cell, &mark) in row.iter_mut().zip(marks_row) {
                if mark == k8 && !cell.occupied() {
                    cell.owner = occupier;
                    cell.lifetime = CellType::Normal.lifetime();
                    num_occupied += 1;
                }
            }
        }
    }
    num_occupied
}

/// Burn every neighbor of `pos` down to a temporary dead cell.
pub(crate) fn apply_fire(board: &mut Board, pos: Pos) {
    for n in board.neighbors(pos) {
        let cell = board.cell_mut(n);
        cell.owner = 0;
        cell.cell_type = CellType::Dead;
        cell.hidden = false;
        cell.lifetime = CellType::Dead.lifetime();
    }
}

/// Pests older than one round infect adjacent opponent normal cells.
pub(crate) fn apply_pest(board: &mut Board) {
    let pests: Vec<(Pos, u8)> = board
        .cells()
        .filter(|(_, c)| c.cell_type == CellType::Pest && c.lifetime < CellType::Pest.lifetime())
        .map(|(p, c)| (p, c.owner))
        .collect();

    for (pos, owner) in pests {
        for n in board.neighbors(pos) {
            let cell = board.cell_mut(n);
            if cell.owner > 0 && cell.owner != owner && cell.cell_type == CellType::Normal {
                cell.owner = owner;
                cell.cell_type = CellType::Pest;
                cell.lifetime = CellType::Pest.lifetime();
            }
        }
    }
}

/// Unhide every cell, spread pests, age lifetimes, and recycle expired cells.
pub(crate) fn reveal(board: &mut Board) {
    for cell in board.cells_mut() {
        cell.hidden = false;
    }
    apply_pest(board);
    for cell in board.cells_mut() {
        if cell.occupied() && cell.lifetime == 0 {
            cell.clear();
        }
        if cell.lifetime > 0 {
            cell.lifetime -= 1;
        }
    }
    board.last_revealed = board.move_num;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, ResourceInfo};

    /// Every cell owned by player 2 except `free`.
    fn walled(free: &[Pos]) -> Board {
        let mut b = Board::new(2, ResourceInfo::empty());
        for cell in b.cells_mut() {
            *cell = Cell::owned(2, CellType::Normal);
        }
        for &p in free {
            *b.cell_mut(p) = Cell::default();
        }
        b
    }

    fn row0(cols: std::ops::RangeInclusive<i32>) -> Vec<Pos> {
        cols.map(|c| Pos::new(0, c)).collect()
    }

    #[test]
    fn test_single_region_not_captured() {
        let mut b = Board::new(2, ResourceInfo::empty());
        let n = occupy_fields(&mut b, 1, Pos::new(5, 4), CellType::Normal);

        assert_eq!(n, 1);
        let placed = b.cell(Pos::new(5, 4));
        assert_eq!(placed.owner, 1);
        assert!(placed.hidden);
        assert_eq!(b.cells().filter(|(_, c)| c.occupied()).count(), 1);
    }

    #[test]
    fn test_smallest_region_captured() {
        let mut b = walled(&row0(0..=8));
        let n = occupy_fields(&mut b, 1, Pos::new(0, 3), CellType::Normal);

        assert_eq!(n, 4);
        for c in 0..=2 {
            let cell = b.cell(Pos::new(0, c));
            assert_eq!(cell.owner, 1);
            assert!(!cell.hidden);
        }
        for c in 4..=8 {
            assert!(!b.cell(Pos::new(0, c)).occupied());
        }
    }

    #[test]
    fn test_opponent_flags_win_region() {
        let mut b = walled(&row0(0..=8));
        *b.cell_mut(Pos::new(1, 0)) = Cell::owned(2, CellType::Flag);
        *b.cell_mut(Pos::new(1, 1)) = Cell::owned(2, CellType::Flag);

        let n = occupy_fields(&mut b, 1, Pos::new(0, 3), CellType::Normal);

        assert_eq!(n, 4);
        for c in 0..=2 {
            assert_eq!(b.cell(Pos::new(0, c)).owner, 2);
        }
    }

    #[test]
    fn test_flag_tie_goes_to_mover() {
        let mut b = walled(&row0(0..=8));
        *b.cell_mut(Pos::new(1, 0)) = Cell::owned(2, CellType::Flag);
        *b.cell_mut(Pos::new(1, 1)) = Cell::owned(1, CellType::Flag);

        occupy_fields(&mut b, 1, Pos::new(0, 3), CellType::Normal);

        for c in 0..=2 {
            assert_eq!(b.cell(Pos::new(0, c)).owner, 1);
        }
    }

    #[test]
    fn test_placed_flag_counts_for_mover() {
        let mut b = walled(&row0(0..=8));
        *b.cell_mut(Pos::new(1, 0)) = Cell::owned(2, CellType::Flag);
        *b.cell_mut(Pos::new(1, 1)) = Cell::owned(2, CellType::Flag);

        occupy_fields(&mut b, 1, Pos::new(0, 3), CellType::Flag);

        // Two opposing flags against the placed flag, counted once up front
        // and once as a boundary cell.
        for c in 0..=2 {
            assert_eq!(b.cell(Pos::new(0, c)).owner, 1);
        }
    }

    #[test]
    fn test_dead_boundary_blocks_capture() {
        let mut b = walled(&row0(0..=8));
        *b.cell_mut(Pos::new(1, 1)) = Cell::dead();

        let n = occupy_fields(&mut b, 1, Pos::new(0, 3), CellType::Normal);

        assert_eq!(n, 1);
        assert!(!b.cell(Pos::new(0, 0)).occupied());
        assert!(!b.cell(Pos::new(0, 4)).occupied());
    }

    #[test]
    fn test_fire_burns_neighbors() {
        let mut b = Board::new(2, ResourceInfo::empty());
        *b.cell_mut(Pos::new(5, 5)) = Cell::owned(2, CellType::Normal);
        apply_fire(&mut b, Pos::new(5, 4));

        for n in b.neighbors(Pos::new(5, 4)) {
            let cell = b.cell(n);
            assert_eq!(cell.cell_type, CellType::Dead);
            assert_eq!(cell.owner, 0);
            assert_eq!(cell.lifetime, 1);
        }
    }

    #[test]
    fn test_pest_spreads_after_first_round() {
        let mut b = Board::new(2, ResourceInfo::empty());
        let pest = Pos::new(5, 4);
        *b.cell_mut(pest) = Cell {
            lifetime: 2,
            ..Cell::owned(1, CellType::Pest)
        };
        *b.cell_mut(Pos::new(5, 5)) = Cell::owned(2, CellType::Normal);
        *b.cell_mut(Pos::new(5, 3)) = Cell::owned(2, CellType::Flag);
        *b.cell_mut(Pos::new(4, 4)) = Cell::owned(1, CellType::Normal);

        reveal(&mut b);

        let infected = b.cell(Pos::new(5, 5));
        assert_eq!(infected.cell_type, CellType::Pest);
        assert_eq!(infected.owner, 1);
        assert_eq!(infected.lifetime, CellType::Pest.lifetime() - 1);
        assert_eq!(b.cell(Pos::new(5, 3)).cell_type, CellType::Flag);
        assert_eq!(b.cell(Pos::new(4, 4)).cell_type, CellType::Normal);
        assert_eq!(b.cell(pest).lifetime, 1);
    }

    #[test]
    fn test_fresh_pest_does_not_spread() {
        let mut b = Board::new(2, ResourceInfo::empty());
        *b.cell_mut(Pos::new(5, 4)) = Cell {
            lifetime: CellType::Pest.lifetime(),
            ..Cell::owned(1, CellType::Pest)
        };
        *b.cell_mut(Pos::new(5, 5)) = Cell::owned(2, CellType::Normal);

        reveal(&mut b);

        assert_eq!(b.cell(Pos::new(5, 5)).cell_type, CellType::Normal);
    }

    #[test]
    fn test_reveal_recycles_expired_cells() {
        let mut b = Board::new(2, ResourceInfo::empty());
        b.move_num = 7;
        *b.cell_mut(Pos::new(0, 0)) = Cell {
            lifetime: 0,
            ..Cell::owned(1, CellType::Fire)
        };
        *b.cell_mut(Pos::new(0, 1)) = Cell {
            lifetime: 1,
            ..Cell::dead()
        };
        *b.cell_mut(Pos::new(0, 2)) = Cell {
            hidden: true,
            ..Cell::owned(2, CellType::Normal)
        };

        reveal(&mut b);

        assert!(!b.cell(Pos::new(0, 0)).occupied());
        assert_eq!(b.cell(Pos::new(0, 1)).lifetime, 0);
        assert!(b.cell(Pos::new(0, 1)).occupied());
        assert!(!b.cell(Pos::new(0, 2)).hidden);
        assert_eq!(b.last_revealed, 7);
    }
}
