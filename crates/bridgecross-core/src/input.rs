//! Input vocabulary - keys become tokens, tokens become intents.
//!
//! The default [`KeyMap`] binds two players to one keyboard:
//!
//! | Keys | Action |
//! |------|--------|
//! | `w a s d` | agent 1 up / left / down / right |
//! | `i j k l` | agent 2 up / left / down / right |
//! | `q` | quit |
//!
//! Upper-case keys are treated like lower-case ones. Anything else is ignored.

use crate::error::CoreError;
use crate::session::Match;
use bridgecross_logic::config::AgentId;
use bridgecross_logic::movement::Direction;
use log::info;
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::Receiver;

/// A decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputToken {
    Move { agent: AgentId, direction: Direction },
    Quit,
}

#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<char, InputToken>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (agent, keys) in [(AgentId(0), ['w', 'a', 's', 'd']), (AgentId(1), ['i', 'j', 'k', 'l'])] {
            let dirs = [
                Direction::Up,
                Direction::Left,
                Direction::Down,
                Direction::Right,
            ];
            for (key, direction) in keys.into_iter().zip(dirs) {
                map.bind(key, InputToken::Move { agent, direction });
            }
        }
        map.bind('q', InputToken::Quit);
        map
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key`, replacing any previous binding.
    pub fn bind(&mut self, key: char, token: InputToken) {
        self.bindings.insert(key.to_ascii_lowercase(), token);
    }

    pub fn decode(&self, key: char) -> Option<InputToken> {
        self.bindings.get(&key.to_ascii_lowercase()).copied()
    }
}

/// Anything that can hand the driver the tokens that arrived since the last
/// frame.
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputToken>;
}

/// Tokens pushed from another thread, e.g. a keyboard reader.
impl InputSource for Receiver<InputToken> {
    fn poll(&mut self) -> Vec<InputToken> {
        self.try_iter().collect()
    }
}

/// Replays a fixed key string, one key per frame, then quits.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    keys: VecDeque<char>,
    map: KeyMap,
    grace_frames: usize,
}

impl ScriptedInput {
    /// `grace_frames` empty frames are inserted after the last key so the
    /// runners can act on it before the quit token arrives.
    pub fn new(script: &str, map: KeyMap, grace_frames: usize) -> Self {
        Self {
            keys: script.chars().collect(),
            map,
            grace_frames,
        }
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputToken> {
        if let Some(key) = self.keys.pop_front() {
            return self.map.decode(key).into_iter().collect();
        }
        if self.grace_frames > 0 {
            self.grace_frames -= 1;
            return Vec::new();
        }
        vec![InputToken::Quit]
    }
}

/// Write a move into its agent's intent slot, or stop the match on quit.
pub fn apply_input(ctx: &Match, token: InputToken) -> Result<(), CoreError> {
    match token {
        InputToken::Move { agent, direction } => ctx.set_intent(agent, direction),
        InputToken::Quit => {
            info!("quit requested");
            ctx.stop();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgecross_logic::config::ArenaConfig;
    use std::sync::mpsc;

    #[test]
    fn default_bindings() {
        let map = KeyMap::default();
        assert_eq!(
            map.decode('w'),
            Some(InputToken::Move {
                agent: AgentId(0),
                direction: Direction::Up
            })
        );
        assert_eq!(
            map.decode('L'),
            Some(InputToken::Move {
                agent: AgentId(1),
                direction: Direction::Right
            })
        );
        assert_eq!(map.decode('q'), Some(InputToken::Quit));
        assert_eq!(map.decode('x'), None);
        assert_eq!(map.decode(' '), None);
    }

    #[test]
    fn rebinding_replaces() {
        let mut map = KeyMap::default();
        map.bind('w', InputToken::Quit);
        assert_eq!(map.decode('w'), Some(InputToken::Quit));
    }

    #[test]
    fn script_replays_then_quits() {
        let mut input = ScriptedInput::new("dx", KeyMap::default(), 1);
        assert_eq!(input.poll().len(), 1);
        assert!(input.poll().is_empty()); // 'x' is unbound
        assert_eq!(input.remaining(), 0);
        assert!(input.poll().is_empty()); // grace
        assert_eq!(input.poll(), vec![InputToken::Quit]);
    }

    #[test]
    fn channel_drains_everything_pending() {
        let (tx, mut rx) = mpsc::channel();
        tx.send(InputToken::Quit).unwrap();
        tx.send(InputToken::Quit).unwrap();
        assert_eq!(rx.poll().len(), 2);
        assert!(rx.poll().is_empty());
    }

    #[test]
    fn apply_sets_intent_and_quit_stops() {
        let m = Match::new(&ArenaConfig::bundled("funnel").unwrap()).unwrap();
        apply_input(
            &m,
            InputToken::Move {
                agent: AgentId(1),
                direction: Direction::Left,
            },
        )
        .unwrap();
        assert_eq!(m.agents()[1].intent.peek(), Some(Direction::Left));
        assert!(m.is_running());
        apply_input(&m, InputToken::Quit).unwrap();
        assert!(!m.is_running());
    }
}
