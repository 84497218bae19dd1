//! BridgeCross Headless Match Harness
//!
//! Validates arenas and the concurrency core without a terminal.
//! Runs entirely in-process: real runner threads, no raw keyboard, frames
//! printed as plain text.
//!
//! Usage:
//!   cargo run -p bridgecross-simtest
//!   cargo run -p bridgecross-simtest -- --verbose
//!   cargo run -p bridgecross-simtest -- --arena causeway --script ddddddddd

use bridgecross_core::prelude::*;
use bridgecross_logic::config::{AgentId, ArenaConfig, ConfigError, Timing, BUNDLED_ARENAS};
use bridgecross_logic::geometry::{self, Severity};
use bridgecross_logic::goals::GoalRule;
use bridgecross_logic::grid::{CellKind, Pos};
use bridgecross_logic::movement::{Direction, Rejection};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const STRESS_SEED: u64 = 0x0B41_D6E5;
const STRESS_MILLIS: u64 = 500;
const RACE_ROUNDS: usize = 200;
/// Empty frames after the last scripted key, so the final step lands.
const SCRIPT_GRACE_FRAMES: usize = 3;

// ── Command line ────────────────────────────────────────────────────────

/// Headless BridgeCross harness
#[derive(Parser, Debug)]
#[command(name = "bridgecross-simtest")]
#[command(about = "Validate arenas and the concurrency core, or replay a key script", long_about = None)]
struct Args {
    /// Enable verbose logging and per-check detail
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Bundled arena name or path to an arena JSON file
    #[arg(long, default_value = "funnel")]
    arena: String,

    /// Keys to replay, one per frame (w a s d / i j k l / q)
    #[arg(long)]
    script: Option<String>,
}

fn load_arena(name_or_path: &str) -> Result<ArenaConfig, ConfigError> {
    if BUNDLED_ARENAS.contains(&name_or_path) {
        ArenaConfig::bundled(name_or_path)
    } else {
        ArenaConfig::from_file(name_or_path)
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let arena = load_arena(&args.arena)?;
    if let Some(script) = &args.script {
        return replay_script(&arena, script);
    }

    let verbose = args.verbose;
    println!("=== BridgeCross Match Harness ===\n");

    let mut results = Vec::new();

    // 1. Arena validation
    results.extend(validate_arenas(&arena, verbose));

    // 2. Passage gate under contention
    results.extend(validate_gate(verbose));

    // 3. Move protocol scenarios
    results.extend(validate_move_protocol(verbose));

    // 4. Goal race
    results.extend(validate_goal_race(verbose));

    // 5. Randomized match with live runners
    results.extend(validate_stress(&arena, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── Script replay ───────────────────────────────────────────────────────

fn replay_script(arena: &ArenaConfig, script: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Arc::new(Match::new(arena)?);
    let handle = start(Arc::clone(&ctx))?;

    // One key per frame; a frame must outlast a step or keys overwrite each other.
    let timing = ctx.timing();
    let frame_delay = timing
        .frame_delay()
        .max(timing.step_delay() + timing.idle_delay());
    info!(
        "replaying {} key(s) on {:?}, one every {:?}",
        script.chars().count(),
        ctx.name(),
        frame_delay
    );

    let mut input = ScriptedInput::new(script, KeyMap::default(), SCRIPT_GRACE_FRAMES);
    let mut sink = TextSink::new(std::io::stdout().lock());
    let report = run_driver(&ctx, &mut input, &mut sink, frame_delay);

    let shutdown = handle.shutdown();
    for name in &shutdown.panicked {
        eprintln!("runner {name} panicked");
    }
    println!("{report}");
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

// ── 1. Arena validation ─────────────────────────────────────────────────

fn validate_arenas(selected: &ArenaConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Arena Validation ---");
    let mut results = Vec::new();

    let mut arenas = Vec::new();
    for name in BUNDLED_ARENAS {
        match ArenaConfig::bundled(name) {
            Ok(a) => arenas.push(a),
            Err(e) => results.push(TestResult {
                name: format!("arena_{name}_parse"),
                passed: false,
                detail: e.to_string(),
            }),
        }
    }
    if !BUNDLED_ARENAS.contains(&selected.name.as_str()) {
        arenas.push(selected.clone());
    }

    for arena in &arenas {
        let layout = match arena.layout() {
            Ok(l) => l,
            Err(e) => {
                results.push(TestResult {
                    name: format!("arena_{}_layout", arena.name),
                    passed: false,
                    detail: e.to_string(),
                });
                continue;
            }
        };
        let findings = geometry::validate_arena(arena, &layout);
        let errors: Vec<_> = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .collect();
        let warnings = findings.len() - errors.len();

        if verbose {
            println!(
                "  {}: {}x{}, {} corridor cell(s), {} goal(s), {} agent(s)",
                arena.name,
                layout.width(),
                layout.height(),
                layout.cells_of(CellKind::CriticalPassage).len(),
                layout.cells_of(CellKind::Goal).len(),
                arena.agents.len()
            );
            for f in &findings {
                println!("    [{:?}] {}: {}", f.severity, f.category, f.message);
            }
        }

        results.push(TestResult {
            name: format!("arena_{}_valid", arena.name),
            passed: errors.is_empty(),
            detail: if errors.is_empty() {
                format!("no errors, {} warning(s)", warnings)
            } else {
                errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            },
        });

        // Bundled maps are meant to force a corridor crossing.
        if BUNDLED_ARENAS.contains(&arena.name.as_str()) {
            results.push(TestResult {
                name: format!("arena_{}_funnel", arena.name),
                passed: warnings == 0,
                detail: format!("{} bypass warning(s)", warnings),
            });
        }

        let spawn_glyphs_ok = Match::new(arena)
            .map(|m| {
                let frame = m.snapshot();
                m.agents()
                    .iter()
                    .all(|a| frame.find(a.marker) == vec![a.spawn])
            })
            .unwrap_or(false);
        results.push(TestResult {
            name: format!("arena_{}_spawn_overlay", arena.name),
            passed: spawn_glyphs_ok || !errors.is_empty(),
            detail: "each marker drawn once, on its spawn".into(),
        });
    }

    results
}

// ── 2. Passage Gate ─────────────────────────────────────────────────────

fn validate_gate(verbose: bool) -> Vec<TestResult> {
    println!("--- Passage Gate ---");
    let mut results = Vec::new();

    for capacity in [1usize, 2] {
        let gate = Arc::new(bridgecross_core::gate::PassageGate::new(capacity));
        let inside = Arc::new(AtomicIsize::new(0));
        let peak = Arc::new(AtomicIsize::new(0));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let inside = Arc::clone(&inside);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    let mut admitted = 0usize;
                    for _ in 0..50_000 {
                        if gate.try_enter() {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            inside.fetch_sub(1, Ordering::SeqCst);
                            gate.leave();
                            admitted += 1;
                        }
                    }
                    admitted
                })
            })
            .collect();
        let admitted: usize = workers.into_iter().filter_map(|w| w.join().ok()).sum();
        let peak = peak.load(Ordering::SeqCst);

        if verbose {
            println!(
                "  capacity {}: {} admissions, peak occupancy {}",
                capacity, admitted, peak
            );
        }
        results.push(TestResult {
            name: format!("gate_capacity_{}_bound", capacity),
            passed: peak >= 1 && peak as usize <= capacity && gate.available() == capacity,
            detail: format!(
                "peak {} of {}, {} free after",
                peak,
                capacity,
                gate.available()
            ),
        });
    }

    let gate = bridgecross_core::gate::PassageGate::new(1);
    gate.try_enter();
    let begin = Instant::now();
    let denied = (0..10_000).all(|_| !gate.try_enter());
    let elapsed = begin.elapsed();
    results.push(TestResult {
        name: "gate_denial_non_blocking".into(),
        passed: denied && elapsed < Duration::from_millis(250),
        detail: format!("10000 denials in {:?}", elapsed),
    });

    gate.leave();
    gate.leave();
    results.push(TestResult {
        name: "gate_release_saturates".into(),
        passed: gate.available() == 1,
        detail: format!("{} free after double release", gate.available()),
    });

    results
}

// ── 3. Move Protocol ────────────────────────────────────────────────────

fn lane() -> Result<Match, CoreError> {
    Match::new(&ArenaConfig::from_rows(
        "lane",
        &["###########", "#F  CCC  F#", "###########"],
        &[Pos::new(1, 2), Pos::new(1, 8)],
        GoalRule::default(),
    ))
}

fn validate_move_protocol(verbose: bool) -> Vec<TestResult> {
    println!("--- Move Protocol ---");
    let mut results = Vec::new();
    let a = AgentId(0);
    let b = AgentId(1);

    let m = match lane() {
        Ok(m) => m,
        Err(e) => {
            results.push(TestResult {
                name: "protocol_arena".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let step = |id, d| attempt_move(&m, id, Some(d)).unwrap_or(MoveOutcome::Idle);

    // Wall
    let before = m.snapshot();
    let wall = step(a, Direction::Up);
    results.push(TestResult {
        name: "protocol_wall_idempotent".into(),
        passed: wall == MoveOutcome::Rejected(Rejection::Wall)
            && m.snapshot() == before
            && m.gate().available() == 1,
        detail: format!("{:?}", wall),
    });

    // Corridor hand-over: A enters, B denied, A leaves, B enters
    let mut trace = Vec::new();
    step(a, Direction::Right);
    trace.push((step(a, Direction::Right), m.gate().available()));
    step(b, Direction::Left);
    trace.push((step(b, Direction::Left), m.gate().available()));
    trace.push((step(a, Direction::Left), m.gate().available()));
    trace.push((step(b, Direction::Left), m.gate().available()));
    if verbose {
        for (outcome, free) in &trace {
            println!("  {:?} -> {} free", outcome, free);
        }
    }
    let expected = [
        (MoveOutcome::Moved { to: Pos::new(1, 4) }, 0),
        (MoveOutcome::Rejected(Rejection::GateClosed), 0),
        (MoveOutcome::Moved { to: Pos::new(1, 3) }, 1),
        (MoveOutcome::Moved { to: Pos::new(1, 6) }, 0),
    ];
    results.push(TestResult {
        name: "protocol_corridor_handover".into(),
        passed: trace == expected,
        detail: format!(
            "{} of {} step(s) matched",
            trace.iter().zip(&expected).filter(|(x, y)| x == y).count(),
            expected.len()
        ),
    });

    // Occupied: B walks to the corridor mouth A wants to enter
    step(b, Direction::Left);
    step(b, Direction::Left);
    let bumped = step(a, Direction::Right);
    results.push(TestResult {
        name: "protocol_occupied_blocks".into(),
        passed: m.position(b).ok() == Some(Pos::new(1, 4))
            && bumped == MoveOutcome::Rejected(Rejection::Occupied),
        detail: format!("{:?}", bumped),
    });

    results.push(TestResult {
        name: "protocol_overlay_consistent".into(),
        passed: m.overlay_mismatches().is_empty(),
        detail: format!("{} mismatched cell(s)", m.overlay_mismatches().len()),
    });

    // Wrong-side goal
    let m = match lane() {
        Ok(m) => m,
        Err(_) => return results,
    };
    let wrong = attempt_move(&m, a, Some(Direction::Left)).unwrap_or(MoveOutcome::Idle);
    results.push(TestResult {
        name: "protocol_wrong_side_goal".into(),
        passed: wrong == MoveOutcome::Moved { to: Pos::new(1, 1) } && m.is_running(),
        detail: format!("{:?}, running={}", wrong, m.is_running()),
    });

    results
}

// ── 4. Goal Race ────────────────────────────────────────────────────────

fn validate_goal_race(verbose: bool) -> Vec<TestResult> {
    println!("--- Goal Race ---");
    let arena = ArenaConfig::from_rows(
        "photo-finish",
        &["#######", "#F C F#", "#######"],
        &[Pos::new(1, 4), Pos::new(1, 2)],
        GoalRule::default(),
    );

    let mut single_winner = 0;
    let mut wins = [0usize; 2];
    for _ in 0..RACE_ROUNDS {
        let Ok(m) = Match::new(&arena) else { break };
        let m = Arc::new(m);
        let barrier = Arc::new(Barrier::new(2));
        let racers: Vec<_> = [(AgentId(0), Direction::Right), (AgentId(1), Direction::Left)]
            .into_iter()
            .map(|(id, d)| {
                let m = Arc::clone(&m);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    attempt_move(&m, id, Some(d)).ok()
                })
            })
            .collect();
        let won = racers
            .into_iter()
            .filter_map(|r| r.join().ok().flatten())
            .filter(|o| matches!(o, MoveOutcome::Won { .. }))
            .count();
        if won == 1 {
            single_winner += 1;
        }
        if let Some(w) = m.report().winner {
            wins[w.0] += 1;
        }
    }

    if verbose {
        println!("  agent 1 won {} time(s), agent 2 won {} time(s)", wins[0], wins[1]);
    }
    vec![TestResult {
        name: "race_single_winner".into(),
        passed: single_winner == RACE_ROUNDS,
        detail: format!("{}/{} rounds had exactly one winner", single_winner, RACE_ROUNDS),
    }]
}

// ── 5. Stress ───────────────────────────────────────────────────────────

fn validate_stress(arena: &ArenaConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized Match ---");
    let mut results = Vec::new();

    let mut arena = arena.clone();
    arena.timing = Timing {
        step_ms: 1,
        idle_ms: 1,
        frame_ms: 1,
    };
    let capacity = arena.corridor_capacity;

    let ctx = match Match::new(&arena) {
        Ok(m) => Arc::new(m),
        Err(e) => {
            results.push(TestResult {
                name: "stress_setup".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let handle = match start(Arc::clone(&ctx)) {
        Ok(h) => h,
        Err(e) => {
            results.push(TestResult {
                name: "stress_spawn".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let mut rng = StdRng::seed_from_u64(STRESS_SEED);
    let mut frames = 0usize;
    let mut torn = 0usize;
    let mut over_capacity = 0usize;
    let begin = Instant::now();
    while ctx.is_running() && begin.elapsed() < Duration::from_millis(STRESS_MILLIS) {
        for agent in ctx.agents() {
            agent.intent.set(Direction::ALL[rng.gen_range(0..4)]);
        }
        let frame = ctx.snapshot();
        frames += 1;
        if ctx.agents().iter().any(|a| frame.find(a.marker).len() != 1) {
            torn += 1;
        }
        if ctx.gate().available() > capacity {
            over_capacity += 1;
        }
        thread::sleep(Duration::from_millis(1));
    }
    let shutdown = handle.shutdown();

    if verbose {
        println!(
            "  {} frame(s) in {:?}; positions {:?}; {}",
            frames,
            begin.elapsed(),
            ctx.positions(),
            shutdown.report
        );
    }

    results.push(TestResult {
        name: "stress_frames_whole".into(),
        passed: torn == 0,
        detail: format!("{} of {} frames torn", torn, frames),
    });
    results.push(TestResult {
        name: "stress_gate_bounded".into(),
        passed: over_capacity == 0,
        detail: format!("{} samples above capacity", over_capacity),
    });
    results.push(TestResult {
        name: "stress_gate_matches_corridor".into(),
        passed: ctx.gate().available() + ctx.agents_in_corridor() == capacity,
        detail: format!(
            "{} free + {} inside = {}",
            ctx.gate().available(),
            ctx.agents_in_corridor(),
            capacity
        ),
    });
    results.push(TestResult {
        name: "stress_no_lost_update".into(),
        passed: ctx.overlay_mismatches().is_empty(),
        detail: format!("{} mismatched cell(s)", ctx.overlay_mismatches().len()),
    });
    results.push(TestResult {
        name: "stress_runners_joined".into(),
        passed: shutdown.panicked.is_empty() && shutdown.report.finished,
        detail: if shutdown.panicked.is_empty() {
            shutdown.report.message.clone()
        } else {
            format!("panicked: {}", shutdown.panicked.join(", "))
        },
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_the_suite_on_funnel() {
        let args = Args::try_parse_from(["bridgecross-simtest"]).unwrap();
        assert!(!args.verbose);
        assert_eq!(args.arena, "funnel");
        assert_eq!(args.script, None);
    }

    #[test]
    fn arena_and_script_take_values() {
        let args = Args::try_parse_from([
            "bridgecross-simtest",
            "-v",
            "--arena",
            "causeway",
            "--script",
            "dddq",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.arena, "causeway");
        assert_eq!(args.script.as_deref(), Some("dddq"));
    }

    #[test]
    fn missing_value_and_unknown_flag_are_refused() {
        assert!(Args::try_parse_from(["bridgecross-simtest", "--arena"]).is_err());
        assert!(Args::try_parse_from(["bridgecross-simtest", "--fast"]).is_err());
    }

    #[test]
    fn bundled_names_load_without_touching_disk() {
        assert_eq!(load_arena("causeway").unwrap().name, "causeway");
        assert!(matches!(
            load_arena("/nonexistent/arena.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
