//! Dispatch from the per-agent [`Brain`] selector to a policy.

use ts_core::AgentRng;
use ts_net::{Agent, Brain, Decision};

use crate::movers::{CarFollowingMover, CollisionFreeMover, FullSpeedMover, IdleMover, RandomMover};
use crate::{BehaviorResult, ThinkContext, Thinkable};

impl Thinkable for Brain {
    fn think(&self, agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Decision {
        match *self {
            Brain::Random        => RandomMover.think(agent, ctx, rng),
            Brain::FullSpeed     => FullSpeedMover.think(agent, ctx, rng),
            Brain::Idle          => IdleMover.think(agent, ctx, rng),
            Brain::CollisionFree => CollisionFreeMover.think(agent, ctx, rng),
            Brain::CarFollowing { niggle_chance, niggle_factor } => {
                CarFollowingMover { niggle_chance, niggle_factor }.think(agent, ctx, rng)
            }
        }
    }
}

/// Reject behavior parameters that no policy can run with.
pub fn validate_brain(brain: Brain) -> BehaviorResult<()> {
    match brain {
        Brain::CarFollowing { niggle_chance, niggle_factor } => {
            CarFollowingMover::new(niggle_chance, niggle_factor).map(|_| ())
        }
        _ => Ok(()),
    }
}

/// Run `agent`'s own behavior with its deterministic RNG for `ctx.tick`.
pub fn decide(agent: &Agent, ctx: &ThinkContext<'_>, seed: u64) -> Decision {
    let mut rng = AgentRng::for_tick(seed, agent.id, ctx.tick);
    agent.brain().think(agent, ctx, &mut rng)
}
