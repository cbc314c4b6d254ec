//! The `Thinkable` trait — the decide-phase contract.

use ts_core::AgentRng;
use ts_net::{Agent, Decision};

use crate::ThinkContext;

/// Produces an agent's [`Decision`] for the next apply phase.
///
/// `think` gets the agent, the read-only [`ThinkContext`], and a per-agent
/// per-tick [`AgentRng`], and returns the decision by value.  It cannot write
/// to the registry; the orchestrator stores the result in the agent's own
/// decision slot after every call has finished.
///
/// # Thread safety
///
/// The decide phase calls `think` for many agents in parallel via Rayon, so
/// implementations must be `Send + Sync`.
pub trait Thinkable: Send + Sync {
    fn think(&self, agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Decision;
}
