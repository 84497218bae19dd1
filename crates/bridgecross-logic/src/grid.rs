//! Static arena layout.
//!
//! A [`Layout`] is parsed once from text rows and never mutated afterwards,
//! so it can be shared between threads without synchronization.
//!
//! | Glyph | Kind |
//! |-------|------|
//! | `#` | [`CellKind::Wall`] |
//! | ` ` | [`CellKind::Floor`] |
//! | `C` | [`CellKind::CriticalPassage`] |
//! | `F` | [`CellKind::Goal`] |

use crate::constants::glyphs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a layout cell is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wall,
    Floor,
    CriticalPassage,
    Goal,
}

impl CellKind {
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            glyphs::WALL => Some(CellKind::Wall),
            glyphs::FLOOR => Some(CellKind::Floor),
            glyphs::CORRIDOR => Some(CellKind::CriticalPassage),
            glyphs::GOAL => Some(CellKind::Goal),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            CellKind::Wall => glyphs::WALL,
            CellKind::Floor => glyphs::FLOOR,
            CellKind::CriticalPassage => glyphs::CORRIDOR,
            CellKind::Goal => glyphs::GOAL,
        }
    }

    pub fn is_walkable(self) -> bool {
        self != CellKind::Wall
    }

    pub fn is_corridor(self) -> bool {
        self == CellKind::CriticalPassage
    }
}

/// A (row, column) cell coordinate. Row 0 is the top of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Why a set of text rows could not be turned into a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no cells")]
    Empty,
    #[error("row {row} is {width} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[error("unknown glyph {glyph:?} at row {row}, col {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

/// Immutable grid of cell kinds, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
}

impl Layout {
    /// Parse text rows into a layout. Every row must have the same width.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(LayoutError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, text) in rows.iter().enumerate() {
            let text = text.as_ref();
            let row_width = text.chars().count();
            if row_width != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    width: row_width,
                    expected: width,
                });
            }
            for (col, glyph) in text.chars().enumerate() {
                let kind = CellKind::from_glyph(glyph)
                    .ok_or(LayoutError::UnknownGlyph { glyph, row, col })?;
                cells.push(kind);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Kind of the cell at `pos`, or `None` outside the grid.
    pub fn cell_kind(&self, pos: Pos) -> Option<CellKind> {
        if self.contains(pos) {
            Some(self.cells[self.index(pos)])
        } else {
            None
        }
    }

    /// False for out-of-bounds positions and walls.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.cell_kind(pos).is_some_and(CellKind::is_walkable)
    }

    /// Row-major index of an in-bounds position.
    pub fn index(&self, pos: Pos) -> usize {
        pos.row * self.width + pos.col
    }

    /// All positions, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Pos::new(row, col)))
    }

    /// All positions holding `kind`, row-major.
    pub fn cells_of(&self, kind: CellKind) -> Vec<Pos> {
        self.positions()
            .filter(|&p| self.cells[self.index(p)] == kind)
            .collect()
    }

    /// In-bounds 4-neighbours of `pos`.
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        crate::movement::Direction::ALL
            .into_iter()
            .filter_map(move |d| d.apply(pos))
            .filter(move |&p| self.contains(p))
    }

    /// Render the layout back to text rows.
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|k| k.glyph()).collect())
            .collect()
    }
}
