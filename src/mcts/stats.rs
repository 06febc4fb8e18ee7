//! MCTS search statistics for diagnostics and tuning.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::CellType;

/// Per-candidate statistics at the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveStats {
    pub row: i32,
    pub col: i32,
    #[serde(rename = "type")]
    pub cell_type: CellType,
    /// Playouts through this candidate.
    pub visits: u32,
    /// UCT score at the end of the search. Infinite if never visited.
    pub u: f64,
    /// Win ratio.
    pub q: f64,
}

/// Statistics collected during MCTS search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Total iterations performed.
    pub iterations: u32,

    /// Longest path from the root, in nodes.
    pub max_depth: usize,

    /// Nodes in the tree.
    pub tree_size: usize,

    /// Wall time of the search.
    pub elapsed: Duration,

    /// The root was fully explored before the budget ran out.
    pub fully_explored: bool,

    /// One entry per root candidate, in candidate order.
    pub moves: Vec<MoveStats>,
}

impl SearchStats {
    /// Calculate iterations per second.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            f64::from(self.iterations) / secs
        }
    }

    /// Lowest win ratio among the candidates; infinite when there are none.
    #[must_use]
    pub fn min_q(&self) -> f64 {
        self.moves.iter().map(|m| m.q).fold(f64::INFINITY, f64::min)
    }

    /// Highest win ratio among the candidates; 0 when there are none.
    #[must_use]
    pub fn max_q(&self) -> f64 {
        self.moves.iter().map(|m| m.q).fold(0.0, f64::max)
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "N: {}", self.iterations)?;
        writeln!(f, "maxDepth: {}", self.max_depth)?;
        writeln!(f, "size: {}", self.tree_size)?;
        writeln!(f, "elapsed: {:.3}", self.elapsed.as_secs_f64())?;
        writeln!(f, "N/sec: {:.1}", self.iterations_per_second())?;
        for m in &self.moves {
            let flag = if m.cell_type == CellType::Flag { " F" } else { "" };
            writeln!(
                f,
                "  ({},{}{}) U:{:.3} Q:{:.2} N:{}",
                m.row, m.col, flag, m.u, m.q, m.visits
            )?;
        }
        Ok(())
    }
}
