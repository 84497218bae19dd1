//! Match context - everything the runners and the driver share.
//!
//! A [`Match`] is built once from a validated arena and then handed to every
//! thread in an `Arc`. The static [`Layout`] is read without locking. The
//! overlay and the committed agent positions live together behind one mutex
//! so a reader never sees a marker that disagrees with a position.

use crate::error::CoreError;
use crate::gate::PassageGate;
use crate::intent::IntentSlot;
use crate::render::Frame;
use bridgecross_logic::config::{AgentId, ArenaConfig, ConfigError, Timing};
use bridgecross_logic::geometry::{self, Severity, ValidationError};
use bridgecross_logic::goals::{GoalRule, Side};
use bridgecross_logic::grid::{CellKind, Layout, Pos};
use bridgecross_logic::movement::Direction;
use log::{info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// What the overlay shows at one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Static(CellKind),
    Agent(AgentId),
}

/// Overlay plus committed positions. Only reachable through [`Match::board`].
#[derive(Debug)]
pub(crate) struct Board {
    pub(crate) tiles: Vec<Tile>,
    pub(crate) positions: Vec<Pos>,
}

impl Board {
    fn new(layout: &Layout, spawns: &[Pos]) -> Self {
        let mut tiles: Vec<Tile> = layout
            .positions()
            .map(|p| Tile::Static(layout.cell_kind(p).unwrap_or(CellKind::Wall)))
            .collect();
        for (i, &spawn) in spawns.iter().enumerate() {
            tiles[layout.index(spawn)] = Tile::Agent(AgentId(i));
        }
        Self {
            tiles,
            positions: spawns.to_vec(),
        }
    }
}

/// One participant. Position is not stored here; it is part of the board.
#[derive(Debug)]
pub struct Agent {
    pub id: AgentId,
    pub marker: char,
    pub side: Side,
    pub spawn: Pos,
    pub intent: IntentSlot,
}

/// The recorded winner of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub winner: AgentId,
    pub marker: char,
    pub message: String,
}

/// End-of-match summary for the process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub finished: bool,
    pub winner: Option<AgentId>,
    pub message: String,
}

impl std::fmt::Display for MatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct Match {
    name: String,
    layout: Arc<Layout>,
    board: Mutex<Board>,
    gate: PassageGate,
    agents: Vec<Agent>,
    goal_rule: GoalRule,
    timing: Timing,
    running: AtomicBool,
    outcome: OnceLock<Outcome>,
}

impl Match {
    /// Validate `config` and place every agent on its spawn cell. Validation
    /// warnings are logged; errors refuse the match.
    pub fn new(config: &ArenaConfig) -> Result<Self, CoreError> {
        let layout = config.layout().map_err(ConfigError::from)?;
        let (errors, warnings): (Vec<ValidationError>, Vec<ValidationError>) =
            geometry::validate_arena(config, &layout)
                .into_iter()
                .partition(|e| e.severity == Severity::Error);
        if !errors.is_empty() {
            return Err(ConfigError::Invalid {
                name: config.name.clone(),
                errors,
            }
            .into());
        }
        for w in &warnings {
            warn!("arena {:?}: [{}] {}", config.name, w.category, w.message);
        }

        let spawns: Vec<Pos> = config.agents.iter().map(|a| a.spawn).collect();
        let agents = config
            .agents
            .iter()
            .enumerate()
            .map(|(i, spec)| Agent {
                id: AgentId(i),
                marker: spec.marker,
                side: spec.side,
                spawn: spec.spawn,
                intent: IntentSlot::new(),
            })
            .collect();

        Ok(Self {
            name: config.name.clone(),
            board: Mutex::new(Board::new(&layout, &spawns)),
            layout: Arc::new(layout),
            gate: PassageGate::new(config.corridor_capacity),
            agents,
            goal_rule: config.goal_rule,
            timing: config.timing,
            running: AtomicBool::new(true),
            outcome: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn gate(&self) -> &PassageGate {
        &self.gate
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Result<&Agent, CoreError> {
        self.agents.get(id.0).ok_or(CoreError::UnknownAgent(id.0))
    }

    pub fn goal_rule(&self) -> GoalRule {
        self.goal_rule
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub(crate) fn board(&self) -> &Mutex<Board> {
        &self.board
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Raise the termination flag. Runners exit on their next check.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!("match {:?} stopping", self.name);
        }
    }

    /// Record `id` as the winner unless someone already won, and lower the
    /// running flag either way. Returns whether this call set the outcome.
    /// Does no logging; the controller calls it with the board locked.
    pub(crate) fn record_winner(&self, id: AgentId) -> bool {
        let marker = self.agents.get(id.0).map(|a| a.marker).unwrap_or('?');
        let won = self
            .outcome
            .set(Outcome {
                winner: id,
                marker,
                message: format!("PLAYER {marker} WINS!"),
            })
            .is_ok();
        self.running.store(false, Ordering::Release);
        won
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.get()
    }

    pub fn report(&self) -> MatchReport {
        match self.outcome.get() {
            Some(o) => MatchReport {
                finished: true,
                winner: Some(o.winner),
                message: o.message.clone(),
            },
            None if self.is_running() => MatchReport {
                finished: false,
                winner: None,
                message: "match in progress".into(),
            },
            None => MatchReport {
                finished: true,
                winner: None,
                message: "match stopped without a winner".into(),
            },
        }
    }

    // ── Agents ─────────────────────────────────────────────────────────

    /// Queue a direction for `id`, replacing any pending one.
    pub fn set_intent(&self, id: AgentId, direction: Direction) -> Result<(), CoreError> {
        self.agent(id)?.intent.set(direction);
        Ok(())
    }

    /// Committed position of `id`.
    pub fn position(&self, id: AgentId) -> Result<Pos, CoreError> {
        self.board
            .lock()
            .positions
            .get(id.0)
            .copied()
            .ok_or(CoreError::UnknownAgent(id.0))
    }

    pub fn positions(&self) -> Vec<Pos> {
        self.board.lock().positions.clone()
    }

    // ── Snapshot ───────────────────────────────────────────────────────

    /// Copy the overlay into a frame. The lock is held only for the copy.
    pub fn snapshot(&self) -> Frame {
        let tiles = self.board.lock().tiles.clone();
        let width = self.layout.width();
        let rows: Vec<Vec<char>> = tiles
            .chunks(width)
            .map(|row| row.iter().map(|&t| self.glyph(t)).collect())
            .collect();
        Frame::new(rows)
    }

    fn glyph(&self, tile: Tile) -> char {
        match tile {
            Tile::Static(kind) => kind.glyph(),
            Tile::Agent(id) => self.agents.get(id.0).map(|a| a.marker).unwrap_or('?'),
        }
    }

    /// Cells where the overlay disagrees with layout plus committed
    /// positions. Empty whenever no move is in flight.
    pub fn overlay_mismatches(&self) -> Vec<Pos> {
        let board = self.board.lock();
        self.layout
            .positions()
            .filter(|&p| {
                let expected = match board.positions.iter().position(|&q| q == p) {
                    Some(i) => Tile::Agent(AgentId(i)),
                    None => Tile::Static(self.layout.cell_kind(p).unwrap_or(CellKind::Wall)),
                };
                board.tiles[self.layout.index(p)] != expected
            })
            .collect()
    }

    /// Number of agents whose committed position is a corridor cell.
    pub fn agents_in_corridor(&self) -> usize {
        self.board
            .lock()
            .positions
            .iter()
            .filter(|&&p| self.layout.cell_kind(p) == Some(CellKind::CriticalPassage))
            .count()
    }
}
