//! Geometry validation for arena layouts.
//!
//! Pure functions that take a layout plus agent data and return validation
//! errors. Nothing here runs at match time; arenas are checked once when
//! they are loaded.

use crate::config::{AgentSpec, ArenaConfig, Timing};
use crate::constants::glyphs;
use crate::goals::GoalRule;
use crate::grid::{CellKind, Layout, Pos};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// An arena validation error.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Every cell reachable from `start` by 4-neighbour steps through cells for
/// which `passable` holds. `start` itself is always included.
pub fn reachable_from(
    layout: &Layout,
    start: Pos,
    passable: impl Fn(CellKind) -> bool,
) -> HashSet<Pos> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in layout.neighbors(current) {
            let open = layout.cell_kind(next).is_some_and(&passable);
            if open && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}

// ── A. Agents ───────────────────────────────────────────────────────────

/// Check agent count and markers: at least one agent, markers unique and
/// distinguishable from layout glyphs.
pub fn check_agents(agents: &[AgentSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if agents.is_empty() {
        errors.push(ValidationError {
            category: "agents",
            severity: Severity::Error,
            message: "Arena declares no agents".into(),
        });
    }

    let mut seen = HashSet::new();
    for (i, a) in agents.iter().enumerate() {
        if CellKind::from_glyph(a.marker).is_some() {
            errors.push(ValidationError {
                category: "agents",
                severity: Severity::Error,
                message: format!(
                    "Agent #{} marker {:?} collides with a layout glyph",
                    i + 1,
                    a.marker
                ),
            });
        }
        if !seen.insert(a.marker) {
            errors.push(ValidationError {
                category: "agents",
                severity: Severity::Error,
                message: format!("Agent #{} reuses marker {:?}", i + 1, a.marker),
            });
        }
    }
    errors
}

/// Check every spawn is inside the grid, walkable, and not shared.
pub fn check_spawns(layout: &Layout, agents: &[AgentSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut taken = HashSet::new();
    for (i, a) in agents.iter().enumerate() {
        if !layout.is_walkable(a.spawn) {
            errors.push(ValidationError {
                category: "spawn",
                severity: Severity::Error,
                message: format!(
                    "Agent #{} spawns at {} which is {}",
                    i + 1,
                    a.spawn,
                    if layout.contains(a.spawn) {
                        "a wall"
                    } else {
                        "outside the grid"
                    }
                ),
            });
        }
        if !taken.insert(a.spawn) {
            errors.push(ValidationError {
                category: "spawn",
                severity: Severity::Error,
                message: format!("Agent #{} shares spawn {} with another agent", i + 1, a.spawn),
            });
        }
        if layout.cell_kind(a.spawn) == Some(CellKind::CriticalPassage) {
            errors.push(ValidationError {
                category: "spawn",
                severity: Severity::Error,
                message: format!(
                    "Agent #{} spawns inside the corridor at {} without gate admission",
                    i + 1,
                    a.spawn
                ),
            });
        }
    }
    errors
}

// ── B. Corridor ─────────────────────────────────────────────────────────

/// Check the corridor exists and forms one 4-connected run.
pub fn check_corridor(layout: &Layout) -> Vec<ValidationError> {
    let corridor = layout.cells_of(CellKind::CriticalPassage);
    let Some(&first) = corridor.first() else {
        return vec![ValidationError {
            category: "corridor",
            severity: Severity::Error,
            message: format!("Layout has no '{}' cells", glyphs::CORRIDOR),
        }];
    };

    let connected = reachable_from(layout, first, CellKind::is_corridor);
    if connected.len() != corridor.len() {
        return vec![ValidationError {
            category: "corridor",
            severity: Severity::Error,
            message: format!(
                "Corridor is split: {} of {} cells connected to {}",
                connected.len(),
                corridor.len(),
                first
            ),
        }];
    }
    Vec::new()
}

/// Check the corridor admits at least one agent.
pub fn check_capacity(capacity: usize) -> Vec<ValidationError> {
    if capacity == 0 {
        vec![ValidationError {
            category: "corridor",
            severity: Severity::Error,
            message: "Corridor capacity is zero; nobody could ever cross".into(),
        }]
    } else {
        Vec::new()
    }
}

/// Check the cadences. A zero idle pause makes every runner spin on its empty
/// intent slot; a zero frame pause does the same to the driver.
pub fn check_timing(timing: &Timing) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (field, value) in [("idle_ms", timing.idle_ms), ("frame_ms", timing.frame_ms)] {
        if value == 0 {
            errors.push(ValidationError {
                category: "timing",
                severity: Severity::Warning,
                message: format!("{field} is 0; the loop will busy-spin"),
            });
        }
    }
    errors
}

// ── C. Connectivity ─────────────────────────────────────────────────────

/// Check each agent can walk from its spawn to at least one goal valid for
/// its side.
pub fn check_goal_reachability(
    layout: &Layout,
    agents: &[AgentSpec],
    rule: &GoalRule,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, a) in agents.iter().enumerate() {
        if !layout.is_walkable(a.spawn) {
            continue; // caught by spawn check
        }
        let goals = rule.valid_goals(layout, a.side);
        if goals.is_empty() {
            errors.push(ValidationError {
                category: "connectivity",
                severity: Severity::Error,
                message: format!("No goal cell is valid for agent #{} ({:?} side)", i + 1, a.side),
            });
            continue;
        }
        let reach = reachable_from(layout, a.spawn, CellKind::is_walkable);
        if !goals.iter().any(|g| reach.contains(g)) {
            errors.push(ValidationError {
                category: "connectivity",
                severity: Severity::Error,
                message: format!(
                    "Agent #{} cannot reach any of its {} goal(s) from {}",
                    i + 1,
                    goals.len(),
                    a.spawn
                ),
            });
        }
    }
    errors
}

/// Check the corridor is load-bearing: with corridor cells treated as walls
/// no agent can reach a goal valid for it. A bypass makes the gate decorative,
/// which is legal but almost certainly a mistake in the map.
pub fn check_funnel(layout: &Layout, agents: &[AgentSpec], rule: &GoalRule) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, a) in agents.iter().enumerate() {
        if !layout.is_walkable(a.spawn) {
            continue;
        }
        let reach = reachable_from(layout, a.spawn, |k| k.is_walkable() && !k.is_corridor());
        if let Some(g) = rule
            .valid_goals(layout, a.side)
            .into_iter()
            .find(|g| reach.contains(g))
        {
            errors.push(ValidationError {
                category: "connectivity",
                severity: Severity::Warning,
                message: format!(
                    "Agent #{} can reach goal {} without crossing the corridor",
                    i + 1,
                    g
                ),
            });
        }
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all arena validations and return combined results.
pub fn validate_arena(config: &ArenaConfig, layout: &Layout) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_agents(&config.agents));
    all.extend(check_spawns(layout, &config.agents));
    all.extend(check_corridor(layout));
    all.extend(check_capacity(config.corridor_capacity));
    all.extend(check_timing(&config.timing));
    all.extend(check_goal_reachability(
        layout,
        &config.agents,
        &config.goal_rule,
    ));
    all.extend(check_funnel(layout, &config.agents, &config.goal_rule));
    all
}
