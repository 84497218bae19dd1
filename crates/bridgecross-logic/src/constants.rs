//! Arena constants - glyphs, markers and default cadences.
//!
//! These are plain constants with no runtime dependency. Both the
//! concurrency core and the headless harness use these.

pub mod glyphs {
    pub const WALL: char = '#';
    pub const FLOOR: char = ' ';
    pub const CORRIDOR: char = 'C';
    /// Goal cells are drawn as a flag.
    pub const GOAL: char = 'F';
}

pub mod markers {
    pub const AGENT_ONE: char = '1';
    pub const AGENT_TWO: char = '2';
}

pub mod timing {
    /// Pause after an agent acted on an intent (the "speed" of an agent).
    pub const STEP_MS: u64 = 100;
    /// Pause when the intent slot was empty, to avoid spinning.
    pub const IDLE_MS: u64 = 10;
    /// Pause between rendered frames.
    pub const FRAME_MS: u64 = 30;
}

/// Corridor capacity when an arena does not specify one.
pub const DEFAULT_CORRIDOR_CAPACITY: usize = 1;
