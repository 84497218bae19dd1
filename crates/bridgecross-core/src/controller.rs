//! Agent controller - the validated single-step move protocol.
//!
//! [`attempt_move`] is the only code that changes an agent's position. It
//! plans the step against the static layout, then under the board lock checks
//! occupancy, asks the gate when stepping into the corridor, decides the goal,
//! and commits. A corridor slot is given back only after the lock is dropped.

use crate::error::CoreError;
use crate::session::{Match, Tile};
use bridgecross_logic::config::AgentId;
use bridgecross_logic::grid::Pos;
use bridgecross_logic::goals::Side;
use bridgecross_logic::movement::{plan_step, Direction, Rejection, StepPlan};
use log::{debug, info, trace};
use serde::Serialize;

/// Result of one move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveOutcome {
    /// No intent was pending.
    Idle,
    Moved { to: Pos },
    /// Moved onto a goal valid for this agent and recorded the win.
    Won { to: Pos },
    Rejected(Rejection),
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. } | MoveOutcome::Won { .. })
    }
}

/// Try to move `id` one cell in `intent`. Refusals leave position, overlay
/// and gate untouched and come back as [`MoveOutcome::Rejected`]; the only
/// error is an unknown agent.
pub fn attempt_move(
    ctx: &Match,
    id: AgentId,
    intent: Option<Direction>,
) -> Result<MoveOutcome, CoreError> {
    let agent = ctx.agent(id)?;
    let Some(direction) = intent else {
        return Ok(MoveOutcome::Idle);
    };
    let (plan, won) = match commit_step(ctx, id, agent.side, direction) {
        Ok(done) => done,
        Err((from, reason)) => {
            trace!("{id} {direction:?} from {from}: {reason:?}");
            return Ok(MoveOutcome::Rejected(reason));
        }
    };

    if plan.enters_corridor() {
        debug!(
            "{id} admitted to corridor at {} ({} slot(s) left)",
            plan.to,
            ctx.gate().available()
        );
    }
    debug!("{id} moved {} -> {}", plan.from, plan.to);

    if plan.exits_corridor() {
        ctx.gate().leave();
        debug!(
            "{id} left the corridor ({} slot(s) free)",
            ctx.gate().available()
        );
    }

    if won {
        info!(
            "match {:?}: {id} ({}) reached a goal and wins",
            ctx.name(),
            agent.marker
        );
        Ok(MoveOutcome::Won { to: plan.to })
    } else {
        Ok(MoveOutcome::Moved { to: plan.to })
    }
}

/// The locked half of a move. The board guard lives exactly as long as this
/// call, so callers log and release the gate only after it returns.
fn commit_step(
    ctx: &Match,
    id: AgentId,
    side: Side,
    direction: Direction,
) -> Result<(StepPlan, bool), (Pos, Rejection)> {
    let layout = ctx.layout();
    let mut board = ctx.board().lock();
    let from = board.positions[id.0];

    let plan = plan_step(layout, from, direction).map_err(|r| (from, r))?;
    let target = layout.index(plan.to);
    if matches!(board.tiles[target], Tile::Agent(other) if other != id) {
        return Err((from, Rejection::Occupied));
    }
    if plan.enters_corridor() && !ctx.gate().try_enter() {
        return Err((from, Rejection::GateClosed));
    }

    let won = plan.reaches_goal()
        && ctx.goal_rule().admits(layout, side, plan.to)
        && ctx.record_winner(id);

    let source = layout.index(from);
    if board.tiles[source] == Tile::Agent(id) {
        board.tiles[source] = Tile::Static(plan.from_kind);
    }
    board.tiles[target] = Tile::Agent(id);
    board.positions[id.0] = plan.to;
    Ok((plan, won))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgecross_logic::config::ArenaConfig;
    use bridgecross_logic::goals::GoalRule;
    use Direction::*;

    const A: AgentId = AgentId(0);
    const B: AgentId = AgentId(1);

    /// `A` starts left of a three-cell corridor, `B` right of it.
    fn lane() -> Match {
        Match::new(&ArenaConfig::from_rows(
            "lane",
            &[
                "###########", //
                "#F  CCC  F#", //
                "###########",
            ],
            &[Pos::new(1, 2), Pos::new(1, 8)],
            GoalRule::default(),
        ))
        .unwrap()
    }

    fn step(m: &Match, id: AgentId, d: Direction) -> MoveOutcome {
        attempt_move(m, id, Some(d)).unwrap()
    }

    #[test]
    fn no_intent_is_idle() {
        let m = lane();
        assert_eq!(attempt_move(&m, A, None).unwrap(), MoveOutcome::Idle);
        assert_eq!(m.position(A).unwrap(), Pos::new(1, 2));
    }

    #[test]
    fn wall_rejection_changes_nothing() {
        let m = lane();
        let before = m.snapshot();
        assert_eq!(step(&m, A, Up), MoveOutcome::Rejected(Rejection::Wall));
        assert_eq!(m.position(A).unwrap(), Pos::new(1, 2));
        assert_eq!(m.snapshot(), before);
        assert_eq!(m.gate().available(), 1);
    }

    #[test]
    fn floor_step_moves_marker() {
        let m = lane();
        assert_eq!(step(&m, A, Right), MoveOutcome::Moved { to: Pos::new(1, 3) });
        assert_eq!(m.snapshot().get(Pos::new(1, 3)), Some('1'));
        assert_eq!(m.snapshot().get(Pos::new(1, 2)), Some(' '));
        assert!(m.overlay_mismatches().is_empty());
    }

    #[test]
    fn corridor_admission_and_release() {
        let m = lane();
        step(&m, A, Right);
        assert!(step(&m, A, Right).moved());
        assert_eq!(m.gate().available(), 0);

        // Moving along the corridor needs no second slot.
        assert!(step(&m, A, Right).moved());
        assert_eq!(m.gate().available(), 0);

        assert!(step(&m, A, Left).moved());
        assert!(step(&m, A, Left).moved());
        assert_eq!(m.position(A).unwrap(), Pos::new(1, 3));
        assert_eq!(m.gate().available(), 1);
    }

    #[test]
    fn occupied_cell_is_refused_before_the_gate() {
        let m = lane();
        step(&m, A, Right);
        step(&m, B, Left);
        step(&m, B, Left);
        step(&m, B, Left);
        step(&m, B, Left);
        assert_eq!(m.position(B).unwrap(), Pos::new(1, 4));
        assert_eq!(step(&m, A, Right), MoveOutcome::Rejected(Rejection::Occupied));
        assert_eq!(m.gate().available(), 0);
    }

    #[test]
    fn valid_goal_wins_and_stops() {
        let m = Match::new(&ArenaConfig::from_rows(
            "short",
            &["#######", "#F C F#", "#######"],
            &[Pos::new(1, 4), Pos::new(1, 2)],
            GoalRule::default(),
        ))
        .unwrap();
        assert_eq!(step(&m, A, Right), MoveOutcome::Won { to: Pos::new(1, 5) });
        assert!(!m.is_running());
        assert_eq!(m.report().winner, Some(A));

        // A later goal still moves but cannot take the win.
        assert_eq!(step(&m, B, Left), MoveOutcome::Moved { to: Pos::new(1, 1) });
        assert_eq!(m.report().winner, Some(A));
    }

    #[test]
    fn wrong_side_goal_is_just_floor() {
        let m = lane();
        assert_eq!(step(&m, A, Left), MoveOutcome::Moved { to: Pos::new(1, 1) });
        assert!(m.is_running());
        assert!(m.outcome().is_none());
        assert_eq!(m.snapshot().get(Pos::new(1, 1)), Some('1'));

        assert!(step(&m, A, Right).moved());
        assert_eq!(m.snapshot().get(Pos::new(1, 1)), Some('F'));
    }
}
