//! BridgeCross Core - concurrent two-agent arena
//!
//! Agents race across a grid whose halves are joined by a narrow corridor.
//! Each agent runs on its own thread; a driver thread paints frames and feeds
//! keyboard input. The pieces they share:
//!
//! - **Layout**: immutable, read without locking
//! - **Board**: overlay and committed positions behind one mutex
//! - **Passage gate**: atomic slot counter, refuses instead of blocking
//! - **Intent slots**: one pending direction per agent, last write wins
//! - **Outcome**: set once by the first agent to reach a valid goal
//!
//! # Example
//!
//! ```rust,no_run
//! use bridgecross_core::prelude::*;
//! use bridgecross_logic::config::ArenaConfig;
//! use std::sync::Arc;
//!
//! let arena = ArenaConfig::bundled("funnel").unwrap();
//! let ctx = Arc::new(Match::new(&arena).unwrap());
//! let handle = start(Arc::clone(&ctx)).unwrap();
//!
//! let mut input = ScriptedInput::new("dddlll", KeyMap::default(), 5);
//! let mut sink = TextSink::new(std::io::stdout());
//! let report = run_driver(&ctx, &mut input, &mut sink, ctx.timing().frame_delay());
//!
//! handle.shutdown();
//! println!("{report}");
//! ```

pub mod controller;
pub mod driver;
pub mod error;
pub mod gate;
pub mod input;
pub mod intent;
pub mod render;
pub mod runner;
pub mod session;

pub use error::CoreError;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::controller::{attempt_move, MoveOutcome};
    pub use crate::driver::run_driver;
    pub use crate::error::CoreError;
    pub use crate::input::{apply_input, InputSource, InputToken, KeyMap, ScriptedInput};
    pub use crate::render::{Frame, FrameSink, TextSink};
    pub use crate::runner::{start, MatchHandle, Shutdown};
    pub use crate::session::{Match, MatchReport, Outcome};
}
