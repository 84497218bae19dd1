//! Single-slot intent mailbox.
//!
//! Input writes a direction, the agent's runner takes it. A new write replaces
//! whatever is pending, and a take empties the slot, so at most one step is
//! ever queued per agent.

use bridgecross_logic::movement::Direction;
use std::sync::atomic::{AtomicU8, Ordering};

const EMPTY: u8 = 0;

fn encode(direction: Direction) -> u8 {
    match direction {
        Direction::Up => 1,
        Direction::Down => 2,
        Direction::Left => 3,
        Direction::Right => 4,
    }
}

fn decode(raw: u8) -> Option<Direction> {
    match raw {
        1 => Some(Direction::Up),
        2 => Some(Direction::Down),
        3 => Some(Direction::Left),
        4 => Some(Direction::Right),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct IntentSlot(AtomicU8);

impl IntentSlot {
    pub fn new() -> Self {
        Self(AtomicU8::new(EMPTY))
    }

    /// Overwrite the pending intent.
    pub fn set(&self, direction: Direction) {
        self.0.store(encode(direction), Ordering::Release);
    }

    /// Remove and return the pending intent.
    pub fn take(&self) -> Option<Direction> {
        decode(self.0.swap(EMPTY, Ordering::AcqRel))
    }

    pub fn peek(&self) -> Option<Direction> {
        decode(self.0.load(Ordering::Acquire))
    }
}
