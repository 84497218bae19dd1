//! Driver loop - frames out, input in, until the match ends.

use crate::input::{apply_input, InputSource};
use crate::render::FrameSink;
use crate::session::{Match, MatchReport};
use log::{info, warn};
use std::thread;
use std::time::Duration;

/// Present a frame, feed pending input into the intent slots, sleep. Repeats
/// while the match runs, then presents one last frame. A sink error stops the
/// match.
pub fn run_driver(
    ctx: &Match,
    input: &mut dyn InputSource,
    sink: &mut dyn FrameSink,
    frame_delay: Duration,
) -> MatchReport {
    let mut frames = 0usize;
    while ctx.is_running() {
        if let Err(e) = sink.present(&ctx.snapshot()) {
            warn!("frame sink failed after {frames} frame(s): {e}");
            ctx.stop();
            return ctx.report();
        }
        frames += 1;

        for token in input.poll() {
            if let Err(e) = apply_input(ctx, token) {
                warn!("ignoring input {token:?}: {e}");
            }
        }
        thread::sleep(frame_delay);
    }

    if let Err(e) = sink.present(&ctx.snapshot()) {
        warn!("final frame not presented: {e}");
    }
    let report = ctx.report();
    info!("match {:?} over after {} frame(s): {}", ctx.name(), frames + 1, report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputToken, KeyMap, ScriptedInput};
    use crate::render::Frame;
    use bridgecross_logic::config::{AgentId, ArenaConfig};
    use bridgecross_logic::movement::Direction;
    use std::io;

    fn funnel() -> Match {
        Match::new(&ArenaConfig::bundled("funnel").unwrap()).unwrap()
    }

    struct Broken;

    impl FrameSink for Broken {
        fn present(&mut self, _: &Frame) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    struct Fixed(Vec<InputToken>);

    impl InputSource for Fixed {
        fn poll(&mut self) -> Vec<InputToken> {
            std::mem::take(&mut self.0)
        }
    }

    #[test]
    fn quit_ends_with_a_final_frame() {
        let m = funnel();
        let mut input = ScriptedInput::new("q", KeyMap::default(), 0);
        let mut frames: Vec<Frame> = Vec::new();
        let report = run_driver(&m, &mut input, &mut frames, Duration::from_millis(1));
        assert_eq!(frames.len(), 2);
        assert!(report.finished);
        assert_eq!(report.winner, None);
    }

    #[test]
    fn sink_failure_stops_the_match() {
        let m = funnel();
        let mut input = Fixed(Vec::new());
        let report = run_driver(&m, &mut input, &mut Broken, Duration::from_millis(1));
        assert!(!m.is_running());
        assert!(report.finished);
    }

    #[test]
    fn input_reaches_intent_slots() {
        let m = funnel();
        let mut input = Fixed(vec![
            InputToken::Move {
                agent: AgentId(0),
                direction: Direction::Right,
            },
            InputToken::Move {
                agent: AgentId(9),
                direction: Direction::Right,
            },
            InputToken::Quit,
        ]);
        let mut frames: Vec<Frame> = Vec::new();
        run_driver(&m, &mut input, &mut frames, Duration::from_millis(1));
        assert_eq!(m.agents()[0].intent.peek(), Some(Direction::Right));
    }

    #[test]
    fn stopped_match_presents_only_the_final_frame() {
        let m = funnel();
        m.stop();
        let mut frames: Vec<Frame> = Vec::new();
        run_driver(&m, &mut Fixed(Vec::new()), &mut frames, Duration::ZERO);
        assert_eq!(frames.len(), 1);
    }
}
