//! Errors raised by the concurrency core.
//!
//! Move refusals are not errors; they come back as
//! [`MoveOutcome::Rejected`](crate::controller::MoveOutcome::Rejected).

use bridgecross_logic::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid arena: {0}")]
    InvalidArena(#[from] ConfigError),
    #[error("failed to spawn runner thread {name:?}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no agent with index {0}")]
    UnknownAgent(usize),
}
