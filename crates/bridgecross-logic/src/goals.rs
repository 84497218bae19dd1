//! Goal-side rules: which goal cells count as a win for which agent.
//!
//! Every agent is assigned a [`Side`]. A [`GoalRule`] splits the arena along
//! one axis; an agent wins only on a goal cell that lies strictly on its side
//! of the boundary. Goal cells on the wrong side are ordinary floor for that
//! agent: it may walk over them, nothing is decided.
//!
//! ```
//! use bridgecross_logic::goals::{GoalRule, Side};
//! use bridgecross_logic::grid::{Layout, Pos};
//!
//! let layout = Layout::parse(&["#######", "#F C F#", "#######"]).unwrap();
//! let rule = GoalRule::ColumnSplit { boundary: None }; // midpoint, column 3
//! assert!(rule.admits(&layout, Side::High, Pos::new(1, 5)));
//! assert!(!rule.admits(&layout, Side::High, Pos::new(1, 1)));
//! assert!(rule.admits(&layout, Side::Low, Pos::new(1, 1)));
//! ```

use crate::grid::{CellKind, Layout, Pos};
use serde::{Deserialize, Serialize};

/// Which half of the arena an agent must finish in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Goal coordinate must be below the boundary (left / top).
    Low,
    /// Goal coordinate must be above the boundary (right / bottom).
    High,
}

/// How goal cells are assigned to sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalRule {
    /// Split by column. `boundary` defaults to `width / 2`.
    ColumnSplit {
        #[serde(default)]
        boundary: Option<usize>,
    },
    /// Split by row. `boundary` defaults to `height / 2`.
    RowSplit {
        #[serde(default)]
        boundary: Option<usize>,
    },
    /// Any goal cell wins for any agent.
    Anywhere,
}

impl Default for GoalRule {
    fn default() -> Self {
        GoalRule::ColumnSplit { boundary: None }
    }
}

impl GoalRule {
    /// Whether landing on `pos` wins the match for an agent on `side`.
    pub fn admits(&self, layout: &Layout, side: Side, pos: Pos) -> bool {
        if layout.cell_kind(pos) != Some(CellKind::Goal) {
            return false;
        }
        match *self {
            GoalRule::ColumnSplit { boundary } => {
                on_side(side, pos.col, boundary.unwrap_or(layout.width() / 2))
            }
            GoalRule::RowSplit { boundary } => {
                on_side(side, pos.row, boundary.unwrap_or(layout.height() / 2))
            }
            GoalRule::Anywhere => true,
        }
    }

    /// Every goal cell that wins for `side`, row-major.
    pub fn valid_goals(&self, layout: &Layout, side: Side) -> Vec<Pos> {
        layout
            .cells_of(CellKind::Goal)
            .into_iter()
            .filter(|&p| self.admits(layout, side, p))
            .collect()
    }
}

fn on_side(side: Side, coord: usize, boundary: usize) -> bool {
    match side {
        Side::Low => coord < boundary,
        Side::High => coord > boundary,
    }
}
