//! Integration tests for the arena loading pipeline.
//!
//! Exercises: JSON → ArenaConfig → Layout → validation → step planning
//!
//! All tests are pure logic with no threads.

use bridgecross_logic::config::{ArenaConfig, ConfigError, BUNDLED_ARENAS};
use bridgecross_logic::geometry::{validate_arena, Severity};
use bridgecross_logic::goals::{GoalRule, Side};
use bridgecross_logic::grid::{CellKind, LayoutError, Pos};
use bridgecross_logic::movement::{plan_step, Direction, Rejection};

// ── Helpers ────────────────────────────────────────────────────────────

/// Walk a path of directions from `start`, failing on the first refusal.
fn walk(arena: &ArenaConfig, start: Pos, path: &[Direction]) -> Pos {
    let layout = arena.layout().unwrap();
    path.iter().fold(start, |at, &d| {
        plan_step(&layout, at, d)
            .unwrap_or_else(|r| panic!("step {d:?} from {at} refused: {r:?}"))
            .to
    })
}

// ── Bundled arenas ─────────────────────────────────────────────────────

#[test]
fn bundled_arenas_have_no_findings() {
    for name in BUNDLED_ARENAS {
        let arena = ArenaConfig::bundled(name).unwrap();
        let layout = arena.layout().unwrap();
        let findings = validate_arena(&arena, &layout);
        assert!(
            findings.is_empty(),
            "{name} has findings: {:?}",
            findings.iter().map(|f| &f.message).collect::<Vec<_>>()
        );
    }
}

#[test]
fn funnel_goals_are_mirrored() {
    let arena = ArenaConfig::bundled("funnel").unwrap();
    let layout = arena.layout().unwrap();
    let one = &arena.agents[0];
    let two = &arena.agents[1];

    // Each agent spawns on the goal the other one is racing for.
    assert_eq!(arena.goal_rule.valid_goals(&layout, one.side), vec![two.spawn]);
    assert_eq!(arena.goal_rule.valid_goals(&layout, two.side), vec![one.spawn]);
}

#[test]
fn funnel_corridor_is_the_only_crossing() {
    let arena = ArenaConfig::bundled("funnel").unwrap();
    let layout = arena.layout().unwrap();
    let corridor = layout.cells_of(CellKind::CriticalPassage);
    assert_eq!(corridor.len(), 3);
    assert!(corridor.iter().all(|p| p.row == corridor[0].row));
}

#[test]
fn causeway_shares_one_goal() {
    let arena = ArenaConfig::bundled("causeway").unwrap();
    let layout = arena.layout().unwrap();
    assert_eq!(arena.goal_rule, GoalRule::Anywhere);
    assert_eq!(
        arena.goal_rule.valid_goals(&layout, Side::Low),
        arena.goal_rule.valid_goals(&layout, Side::High)
    );
}

#[test]
fn causeway_walk_crosses_corridor_once() {
    let arena = ArenaConfig::bundled("causeway").unwrap();
    let layout = arena.layout().unwrap();
    use Direction::*;
    let mut at = arena.agents[0].spawn;
    let mut entries = 0;
    let mut exits = 0;
    let path = [Right; 9]
        .into_iter()
        .chain([Down; 3])
        .chain([Right; 9]);
    for d in path {
        let plan = plan_step(&layout, at, d).unwrap();
        entries += plan.enters_corridor() as u32;
        exits += plan.exits_corridor() as u32;
        at = plan.to;
    }
    assert_eq!((entries, exits), (1, 1));
    assert_eq!(layout.cell_kind(at), Some(CellKind::Goal));
}

// ── Hand-written arenas ────────────────────────────────────────────────

#[test]
fn json_arena_with_markers_in_layout_is_rejected() {
    let arena = ArenaConfig::from_json(
        r######"{
            "name": "ladder",
            "rows": [
                "#####",
                "#F 1#",
                "##C##",
                "##C##",
                "#2 F#",
                "#####"
            ],
            "agents": [
                { "marker": "A", "spawn": { "row": 1, "col": 2 }, "side": "high" },
                { "marker": "B", "spawn": { "row": 4, "col": 2 }, "side": "low" }
            ],
            "goal_rule": { "kind": "row_split" }
        }"######,
    )
    .unwrap();
    assert_eq!(arena.agents[0].marker, 'A');
    // Markers belong on the overlay, never in the layout text.
    assert!(matches!(
        arena.validated_layout(),
        Err(ConfigError::Layout(LayoutError::UnknownGlyph { glyph: '1', .. }))
    ));
}

#[test]
fn hand_written_arena_validates() {
    let arena = ArenaConfig::from_rows(
        "ladder",
        &[
            "#####", //
            "#F  #", //
            "##C##", //
            "##C##", //
            "#  F#", //
            "#####",
        ],
        &[Pos::new(1, 2), Pos::new(4, 2)],
        GoalRule::RowSplit { boundary: None },
    );
    let layout = arena.validated_layout().unwrap();
    assert_eq!(
        walk(&arena, Pos::new(1, 2), &[Direction::Down, Direction::Down, Direction::Down]),
        Pos::new(4, 2)
    );
    assert_eq!(
        plan_step(&layout, Pos::new(1, 2), Direction::Up),
        Err(Rejection::Wall)
    );
}

#[test]
fn bypass_is_reported_but_not_fatal() {
    let arena = ArenaConfig::from_rows(
        "leaky",
        &[
            "#######", //
            "#  C  #", //
            "#     #", //
            "#F   F#", //
            "#######",
        ],
        &[Pos::new(1, 1), Pos::new(1, 5)],
        GoalRule::default(),
    );
    let layout = arena.layout().unwrap();
    let findings = validate_arena(&arena, &layout);
    assert!(!findings.is_empty());
    assert!(findings.iter().all(|f| f.severity == Severity::Warning));
    assert!(arena.validated_layout().is_ok());
}

#[test]
fn zero_idle_pause_is_warned_about() {
    let mut arena = ArenaConfig::bundled("funnel").unwrap();
    arena.timing.idle_ms = 0;
    let layout = arena.layout().unwrap();
    let findings = validate_arena(&arena, &layout);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, "timing");
    assert!(arena.validated_layout().is_ok());
}

#[test]
fn ragged_json_layout_is_a_layout_error() {
    let arena = ArenaConfig::from_rows("ragged", &["####", "#F"], &[Pos::new(1, 1)], GoalRule::Anywhere);
    assert!(matches!(
        arena.validated_layout(),
        Err(ConfigError::Layout(_))
    ));
}
