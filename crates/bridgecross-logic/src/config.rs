//! Arena configuration loaded from JSON.
//!
//! Arenas are described in JSON so new maps need no code changes. Two arenas
//! ship with the crate (see [`ArenaConfig::bundled`]):
//!
//! | Name | Shape | Goal rule |
//! |------|-------|-----------|
//! | `funnel` | Mirrored halves joined by a three-cell corridor | column split |
//! | `causeway` | Shared goal beyond a vertical corridor | anywhere |
//!
//! ```
//! use bridgecross_logic::config::ArenaConfig;
//!
//! let arena = ArenaConfig::bundled("funnel").unwrap();
//! let layout = arena.layout().unwrap();
//! assert_eq!(arena.agents.len(), 2);
//! assert!(layout.is_walkable(arena.agents[0].spawn));
//! ```

use crate::constants::{markers, timing, DEFAULT_CORRIDOR_CAPACITY};
use crate::geometry::{self, Severity, ValidationError};
use crate::goals::{GoalRule, Side};
use crate::grid::{Layout, LayoutError, Pos};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const FUNNEL_JSON: &str = include_str!("../../../data/funnel.json");
const CAUSEWAY_JSON: &str = include_str!("../../../data/causeway.json");

/// Names accepted by [`ArenaConfig::bundled`].
pub const BUNDLED_ARENAS: [&str; 2] = ["funnel", "causeway"];

/// Index of an agent within its arena (0 for the first agent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent #{}", self.0 + 1)
    }
}

/// One agent's fixed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Single character drawn on the overlay.
    pub marker: char,
    pub spawn: Pos,
    /// Which half of the arena this agent must finish in.
    pub side: Side,
}

/// Loop cadences in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Pause after an agent acted.
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    /// Pause after an agent found its intent slot empty.
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,
    /// Pause between frames on the driver.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

fn default_step_ms() -> u64 {
    timing::STEP_MS
}
fn default_idle_ms() -> u64 {
    timing::IDLE_MS
}
fn default_frame_ms() -> u64 {
    timing::FRAME_MS
}
fn default_capacity() -> usize {
    DEFAULT_CORRIDOR_CAPACITY
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            step_ms: timing::STEP_MS,
            idle_ms: timing::IDLE_MS,
            frame_ms: timing::FRAME_MS,
        }
    }
}

impl Timing {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Complete description of a match arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub name: String,
    /// Layout text, one string per row (`#` wall, space floor, `C` corridor, `F` goal).
    pub rows: Vec<String>,
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub goal_rule: GoalRule,
    /// How many agents may be inside the corridor at once.
    #[serde(default = "default_capacity")]
    pub corridor_capacity: usize,
    #[serde(default)]
    pub timing: Timing,
}

/// Why an arena could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("arena JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read arena file: {0}")]
    Io(#[from] std::io::Error),
    #[error("arena layout is malformed: {0}")]
    Layout(#[from] LayoutError),
    #[error("no bundled arena named {0:?}")]
    UnknownArena(String),
    #[error(
        "arena {name:?} failed validation with {} error(s): {}",
        .errors.len(),
        summarize(.errors)
    )]
    Invalid {
        name: String,
        errors: Vec<ValidationError>,
    },
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ArenaConfig {
    /// Parse an arena from JSON text. Does not validate.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse an arena JSON file. Does not validate.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// One of the arenas shipped under `data/`.
    pub fn bundled(name: &str) -> Result<Self, ConfigError> {
        match name {
            "funnel" => Self::from_json(FUNNEL_JSON),
            "causeway" => Self::from_json(CAUSEWAY_JSON),
            other => Err(ConfigError::UnknownArena(other.to_string())),
        }
    }

    /// Build an arena from layout rows and spawn cells, using default markers
    /// (`1`, `2`, ...), alternating sides (`High`, `Low`, ...) and default timing.
    pub fn from_rows<S: AsRef<str>>(name: &str, rows: &[S], spawns: &[Pos], goal_rule: GoalRule) -> Self {
        let agents = spawns
            .iter()
            .enumerate()
            .map(|(i, &spawn)| AgentSpec {
                marker: default_marker(i),
                spawn,
                side: if i % 2 == 0 { Side::High } else { Side::Low },
            })
            .collect();
        Self {
            name: name.to_string(),
            rows: rows.iter().map(|r| r.as_ref().to_string()).collect(),
            agents,
            goal_rule,
            corridor_capacity: DEFAULT_CORRIDOR_CAPACITY,
            timing: Timing::default(),
        }
    }

    /// Parse the layout rows.
    pub fn layout(&self) -> Result<Layout, LayoutError> {
        Layout::parse(self.rows.as_slice())
    }

    /// Parse the layout and run every validation; warnings are allowed,
    /// errors are not.
    pub fn validated_layout(&self) -> Result<Layout, ConfigError> {
        let layout = self.layout()?;
        let errors: Vec<ValidationError> = geometry::validate_arena(self, &layout)
            .into_iter()
            .filter(|e| e.severity == Severity::Error)
            .collect();
        if errors.is_empty() {
            Ok(layout)
        } else {
            Err(ConfigError::Invalid {
                name: self.name.clone(),
                errors,
            })
        }
    }
}

fn default_marker(index: usize) -> char {
    match index {
        0 => markers::AGENT_ONE,
        1 => markers::AGENT_TWO,
        n => char::from_digit((n as u32 + 1) % 10, 10).unwrap_or('?'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_arenas_parse_and_validate() {
        for name in BUNDLED_ARENAS {
            let arena = ArenaConfig::bundled(name).unwrap();
            assert_eq!(arena.name, name);
            arena
                .validated_layout()
                .unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn unknown_bundled_arena() {
        assert!(matches!(
            ArenaConfig::bundled("atlantis"),
            Err(ConfigError::UnknownArena(_))
        ));
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let arena = ArenaConfig::from_json(
            r######"{
                "name": "tiny",
                "rows": ["#####", "# CF#", "#####"],
                "agents": [{ "marker": "1", "spawn": { "row": 1, "col": 1 }, "side": "high" }]
            }"######,
        )
        .unwrap();
        assert_eq!(arena.corridor_capacity, 1);
        assert_eq!(arena.timing, Timing::default());
        assert_eq!(arena.goal_rule, GoalRule::ColumnSplit { boundary: None });
        assert_eq!(arena.timing.step_delay(), Duration::from_millis(100));
    }

    #[test]
    fn partial_timing_keeps_other_defaults() {
        let arena = ArenaConfig::from_json(
            r######"{
                "name": "tiny",
                "rows": ["# F#"],
                "agents": [{ "marker": "1", "spawn": { "row": 0, "col": 1 }, "side": "high" }],
                "timing": { "step_ms": 5 }
            }"######,
        )
        .unwrap();
        assert_eq!(arena.timing.step_ms, 5);
        assert_eq!(arena.timing.idle_ms, 10);
        assert_eq!(arena.timing.frame_ms, 30);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = ArenaConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn from_rows_assigns_markers_and_sides() {
        let arena = ArenaConfig::from_rows(
            "pair",
            &["F C F"],
            &[Pos::new(0, 1), Pos::new(0, 3)],
            GoalRule::default(),
        );
        assert_eq!(arena.agents[0].marker, '1');
        assert_eq!(arena.agents[0].side, Side::High);
        assert_eq!(arena.agents[1].marker, '2');
        assert_eq!(arena.agents[1].side, Side::Low);
    }

    #[test]
    fn invalid_arena_lists_errors() {
        let arena = ArenaConfig::from_rows("walled", &["#C#"], &[Pos::new(0, 0)], GoalRule::Anywhere);
        match arena.validated_layout() {
            Err(ConfigError::Invalid { name, errors }) => {
                assert_eq!(name, "walled");
                assert!(!errors.is_empty());
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
