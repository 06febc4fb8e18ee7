//! Cell types, cells, and per-player piece budgets.

use serde::{Deserialize, Serialize};

/// What occupies a cell.
///
/// Serialized as its discriminant; clients depend on the numbering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CellType {
    /// Empty when unowned, otherwise the owner's regular piece.
    #[default]
    Normal = 0,
    /// Blocked cell, usually left behind by a conflict or a fire.
    Dead = 1,
    /// Collectible cell. Never placed by the rules in this crate.
    Grass = 2,
    /// Unowned static obstacle.
    Rock = 3,
    /// Burns its neighbors to dead cells on placement.
    Fire = 4,
    /// Tips area captures towards its owner.
    Flag = 5,
    /// Spreads onto adjacent opponent cells on every reveal.
    Pest = 6,
    /// Death bomb: may overwrite any occupied cell.
    Death = 7,
}

/// Marker for cells that never expire.
pub const PERMANENT: i32 = -1;

impl CellType {
    /// Number of cell types.
    pub const COUNT: usize = 8;

    /// All cell types in discriminant order.
    pub const ALL: [CellType; Self::COUNT] = [
        CellType::Normal,
        CellType::Dead,
        CellType::Grass,
        CellType::Rock,
        CellType::Fire,
        CellType::Flag,
        CellType::Pest,
        CellType::Death,
    ];

    /// Reveal cycles a freshly placed cell of this type survives.
    #[must_use]
    pub const fn lifetime(self) -> i32 {
        match self {
            CellType::Fire | CellType::Dead | CellType::Death => 1,
            CellType::Pest => 3,
            _ => PERMANENT,
        }
    }

    /// Pieces a player can place.
    #[must_use]
    pub const fn is_player_piece(self) -> bool {
        matches!(
            self,
            CellType::Normal | CellType::Fire | CellType::Flag | CellType::Pest | CellType::Death
        )
    }

    /// Placing this type forces a reveal cycle.
    #[must_use]
    pub const fn reveals_immediately(self) -> bool {
        !matches!(self, CellType::Normal | CellType::Flag)
    }
}

impl From<CellType> for u8 {
    fn from(t: CellType) -> u8 {
        t as u8
    }
}

impl TryFrom<u8> for CellType {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        CellType::ALL
            .get(v as usize)
            .copied()
            .ok_or_else(|| format!("unknown cell type {v}"))
    }
}

/// One grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "type")]
    pub cell_type: CellType,

    /// Owning player number, 0 when unowned.
    pub owner: u8,

    /// Not yet revealed to the opponent.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,

    /// Scoring value.
    #[serde(rename = "v", default)]
    pub value: i32,

    /// Bit `p-1` set: blocked for player `p`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub blocked: u8,

    /// Reveal cycles left before the cell is cleared; `PERMANENT` never expires.
    #[serde(skip, default = "permanent")]
    pub lifetime: i32,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

fn permanent() -> i32 {
    PERMANENT
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            cell_type: CellType::Normal,
            owner: 0,
            hidden: false,
            value: 0,
            blocked: 0,
            lifetime: PERMANENT,
        }
    }
}

impl Cell {
    /// A permanent, unowned dead cell.
    #[must_use]
    pub fn dead() -> Self {
        Self {
            cell_type: CellType::Dead,
            ..Self::default()
        }
    }

    /// A revealed, permanent cell of `cell_type` owned by `owner`.
    #[must_use]
    pub fn owned(owner: u8, cell_type: CellType) -> Self {
        Self {
            cell_type,
            owner,
            ..Self::default()
        }
    }

    /// Dead or owned.
    #[inline]
    #[must_use]
    pub fn occupied(&self) -> bool {
        self.cell_type == CellType::Dead || self.owner > 0
    }

    /// Not blocked for `player`.
    #[inline]
    #[must_use]
    pub fn is_avail(&self, player: u8) -> bool {
        player == 0 || self.blocked & (1 << (player - 1)) == 0
    }

    /// Back to an empty, unowned, revealed normal cell. Keeps value and blocks.
    pub fn clear(&mut self) {
        self.cell_type = CellType::Normal;
        self.owner = 0;
        self.hidden = false;
        self.lifetime = PERMANENT;
    }
}

/// Remaining pieces per cell type for one player. −1 means unlimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    pub num_pieces: [i32; CellType::COUNT],
}

impl ResourceInfo {
    /// No pieces at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            num_pieces: [0; CellType::COUNT],
        }
    }

    /// Every player piece unlimited.
    #[must_use]
    pub fn unlimited() -> Self {
        let mut r = Self::empty();
        for t in CellType::ALL {
            if t.is_player_piece() {
                r.num_pieces[t as usize] = -1;
            }
        }
        r
    }

    /// Set the count for one type.
    #[must_use]
    pub fn with(mut self, cell_type: CellType, count: i32) -> Self {
        self.num_pieces[cell_type as usize] = count;
        self
    }

    /// Remaining count, −1 for unlimited.
    #[must_use]
    pub fn remaining(&self, cell_type: CellType) -> i32 {
        self.num_pieces[cell_type as usize]
    }

    /// At least one piece (or unlimited) left.
    #[must_use]
    pub fn has(&self, cell_type: CellType) -> bool {
        self.remaining(cell_type) != 0
    }

    /// Use one piece. Unlimited counts stay unlimited.
    pub fn consume(&mut self, cell_type: CellType) {
        let n = &mut self.num_pieces[cell_type as usize];
        if *n > 0 {
            *n -= 1;
        }
    }
}

impl Default for ResourceInfo {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetimes() {
        assert_eq!(CellType::Normal.lifetime(), PERMANENT);
        assert_eq!(CellType::Flag.lifetime(), PERMANENT);
        assert_eq!(CellType::Fire.lifetime(), 1);
        assert_eq!(CellType::Death.lifetime(), 1);
        assert_eq!(CellType::Pest.lifetime(), 3);
    }

    #[test]
    fn test_reveals_immediately() {
        assert!(!CellType::Normal.reveals_immediately());
        assert!(!CellType::Flag.reveals_immediately());
        assert!(CellType::Fire.reveals_immediately());
        assert!(CellType::Pest.reveals_immediately());
        assert!(CellType::Death.reveals_immediately());
    }

    #[test]
    fn test_occupied() {
        assert!(!Cell::default().occupied());
        assert!(Cell::dead().occupied());
        assert!(Cell::owned(1, CellType::Normal).occupied());
        assert!(!Cell::owned(0, CellType::Rock).occupied());
    }

    #[test]
    fn test_blocked_mask() {
        let cell = Cell {
            blocked: 0b10,
            ..Cell::default()
        };
        assert!(cell.is_avail(1));
        assert!(!cell.is_avail(2));
    }

    #[test]
    fn test_clear_keeps_value() {
        let mut cell = Cell {
            value: 3,
            hidden: true,
            lifetime: 0,
            ..Cell::owned(2, CellType::Pest)
        };
        cell.clear();
        assert!(!cell.occupied());
        assert!(!cell.hidden);
        assert_eq!(cell.value, 3);
        assert_eq!(cell.lifetime, PERMANENT);
    }

    #[test]
    fn test_resources() {
        let mut r = ResourceInfo::unlimited().with(CellType::Fire, 1);
        assert!(r.has(CellType::Fire));
        r.consume(CellType::Fire);
        assert!(!r.has(CellType::Fire));
        r.consume(CellType::Fire);
        assert_eq!(r.remaining(CellType::Fire), 0);

        r.consume(CellType::Flag);
        assert_eq!(r.remaining(CellType::Flag), -1);
        assert!(!r.has(CellType::Dead));
    }

    #[test]
    fn test_cell_json() {
        let cell = Cell::owned(2, CellType::Flag);
        let json = serde_json::to_value(cell).unwrap();
        assert_eq!(json, serde_json::json!({"type": 5, "owner": 2, "v": 0}));

        let hidden = Cell {
            hidden: true,
            ..Cell::owned(1, CellType::Normal)
        };
        let json = serde_json::to_value(hidden).unwrap();
        assert_eq!(json["hidden"], serde_json::json!(true));
    }

    #[test]
    fn test_cell_type_rejects_unknown() {
        assert!(serde_json::from_str::<CellType>("8").is_err());
        assert_eq!(serde_json::from_str::<CellType>("6").unwrap(), CellType::Pest);
    }
}
