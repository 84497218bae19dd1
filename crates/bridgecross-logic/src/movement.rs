//! Pure step planning against the static layout.
//!
//! This is the half of the move protocol that can be decided from the static
//! layout alone:
//! 1. Apply the unit offset of the direction to the current cell
//! 2. Refuse cells outside the grid or made of wall
//! 3. Classify the step: entering the corridor, leaving it, landing on a goal
//!
//! Occupancy by other agents and admission through the passage gate depend on
//! shared mutable state and are checked by the caller.

use crate::grid::{CellKind, Layout, Pos};
use serde::{Deserialize, Serialize};

/// One of the four unit moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row delta, column delta).
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Neighbouring cell in this direction. `None` when it would fall off the
    /// top or left edge; the bottom and right edges are the layout's to check.
    pub fn apply(self, pos: Pos) -> Option<Pos> {
        let (dr, dc) = self.offset();
        Some(Pos::new(
            pos.row.checked_add_signed(dr)?,
            pos.col.checked_add_signed(dc)?,
        ))
    }
}

/// Why a step was refused. Refusals are normal game flow, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Candidate cell lies outside the grid.
    OutOfBounds,
    /// Candidate cell is a wall.
    Wall,
    /// Another agent currently occupies the candidate cell.
    Occupied,
    /// The corridor is at capacity.
    GateClosed,
}

/// A step that passed the static-layout checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub from: Pos,
    pub to: Pos,
    pub from_kind: CellKind,
    pub to_kind: CellKind,
}

impl StepPlan {
    /// Moving from outside the corridor onto a corridor cell. Requires gate admission.
    pub fn enters_corridor(&self) -> bool {
        self.to_kind.is_corridor() && !self.from_kind.is_corridor()
    }

    /// Moving from a corridor cell onto a non-corridor cell. Releases the gate.
    pub fn exits_corridor(&self) -> bool {
        self.from_kind.is_corridor() && !self.to_kind.is_corridor()
    }

    pub fn reaches_goal(&self) -> bool {
        self.to_kind == CellKind::Goal
    }
}

/// Plan a single step from `from` in `direction` against the static layout.
pub fn plan_step(layout: &Layout, from: Pos, direction: Direction) -> Result<StepPlan, Rejection> {
    let from_kind = layout.cell_kind(from).ok_or(Rejection::OutOfBounds)?;
    let to = direction.apply(from).ok_or(Rejection::OutOfBounds)?;
    let to_kind = layout.cell_kind(to).ok_or(Rejection::OutOfBounds)?;
    if !to_kind.is_walkable() {
        return Err(Rejection::Wall);
    }
    Ok(StepPlan {
        from,
        to,
        from_kind,
        to_kind,
    })
}
