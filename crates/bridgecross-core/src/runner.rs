//! Agent runners - one OS thread per agent.
//!
//! Each runner polls its agent's intent slot at a fixed cadence and feeds
//! whatever it finds to [`attempt_move`]. Runners share nothing with each
//! other except the [`Match`]; the only way to stop them is the match's
//! termination flag.

use crate::controller::{attempt_move, MoveOutcome};
use crate::error::CoreError;
use crate::session::{Match, MatchReport};
use bridgecross_logic::config::AgentId;
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct Runner {
    name: String,
    handle: JoinHandle<()>,
}

/// What [`MatchHandle::shutdown`] found once every runner was joined.
#[derive(Debug, Clone)]
pub struct Shutdown {
    pub report: MatchReport,
    /// Names of runner threads that panicked.
    pub panicked: Vec<String>,
}

/// Owns the runner threads of a started match. Dropping it stops the match
/// and joins them.
pub struct MatchHandle {
    ctx: Arc<Match>,
    runners: Vec<Runner>,
}

/// Spawn one runner per agent. If any spawn fails the ones already started
/// are stopped and joined before the error is returned.
pub fn start(ctx: Arc<Match>) -> Result<MatchHandle, CoreError> {
    let mut handle = MatchHandle {
        ctx: Arc::clone(&ctx),
        runners: Vec::with_capacity(ctx.agents().len()),
    };

    for agent in ctx.agents() {
        let name = format!("agent-{}", agent.marker);
        let id = agent.id;
        let worker_ctx = Arc::clone(&ctx);
        let spawned = thread::Builder::new()
            .name(name.clone())
            .spawn(move || agent_loop(worker_ctx, id));

        match spawned {
            Ok(join) => handle.runners.push(Runner { name, handle: join }),
            Err(source) => {
                // Dropping the handle stops and joins the runners started so far.
                drop(handle);
                return Err(CoreError::Spawn { name, source });
            }
        }
    }

    info!(
        "match {:?} started with {} agent(s), corridor capacity {}",
        ctx.name(),
        ctx.agents().len(),
        ctx.gate().capacity()
    );
    Ok(handle)
}

fn agent_loop(ctx: Arc<Match>, id: AgentId) {
    let timing = ctx.timing();
    let Ok(agent) = ctx.agent(id) else {
        warn!("runner started for unknown {id}");
        return;
    };
    debug!("{id} runner up at {}", agent.spawn);

    while ctx.is_running() {
        let pause = match agent.intent.take() {
            Some(direction) => {
                match attempt_move(&ctx, id, Some(direction)) {
                    Ok(MoveOutcome::Won { to }) => debug!("{id} finished at {to}"),
                    Ok(_) => {}
                    Err(e) => {
                        warn!("{id} runner giving up: {e}");
                        return;
                    }
                }
                timing.step_delay()
            }
            None => timing.idle_delay(),
        };
        thread::sleep(pause);
    }
    debug!("{id} runner down");
}

impl MatchHandle {
    /// Runner thread names, in agent order.
    pub fn runner_names(&self) -> Vec<&str> {
        self.runners.iter().map(|r| r.name.as_str()).collect()
    }

    /// Stop the match and join every runner.
    pub fn shutdown(mut self) -> Shutdown {
        self.ctx.stop();
        let panicked = self.join_all();
        Shutdown {
            report: self.ctx.report(),
            panicked,
        }
    }

    /// Join every runner without stopping the match first; returns once the
    /// match has ended some other way (a win or a quit).
    pub fn wait(mut self) -> Shutdown {
        let panicked = self.join_all();
        Shutdown {
            report: self.ctx.report(),
            panicked,
        }
    }

    fn join_all(&mut self) -> Vec<String> {
        let mut panicked = Vec::new();
        for runner in self.runners.drain(..) {
            if runner.handle.join().is_err() {
                warn!("runner {} panicked", runner.name);
                panicked.push(runner.name);
            }
        }
        panicked
    }
}

impl Drop for MatchHandle {
    fn drop(&mut self) {
        if !self.runners.is_empty() {
            self.ctx.stop();
            self.join_all();
        }
    }
}
