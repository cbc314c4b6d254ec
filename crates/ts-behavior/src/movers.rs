//! Built-in motion policies.
//!
//! | Policy               | Acceleration                          | Lane change | Turn        |
//! |----------------------|---------------------------------------|-------------|-------------|
//! | [`RandomMover`]      | uniform in the vehicle's bounds       | uniform     | random      |
//! | [`FullSpeedMover`]   | vehicle maximum                       | none        | random      |
//! | [`IdleMover`]        | 0                                     | none        | random      |
//! | [`CarFollowingMover`]| reach the leader's projected position | none        | guided      |
//! | [`CollisionFreeMover`]| keep a stopping gap to the leader    | none        | guided      |
//!
//! "random" is [`random_turn`](crate::turn::random_turn); "guided" is
//! [`choose_next_lane`](crate::turn::choose_next_lane).

use ts_core::AgentRng;
use ts_net::{Agent, Brain, Decision, LaneChange};

use crate::turn::{choose_next_lane, random_turn};
use crate::{BehaviorError, BehaviorResult, ThinkContext, Thinkable};

/// Look-ahead horizon in seconds for the following policies.
pub const HORIZON_SECS: f64 = 1.0;

/// Smallest target velocity a niggle may produce, m/s.
pub const NIGGLE_FLOOR: f64 = 0.1;

// ── Random ────────────────────────────────────────────────────────────────────

pub struct RandomMover;

impl Thinkable for RandomMover {
    fn think(&self, agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Decision {
        let v = agent.vehicle();
        let acceleration = if v.min_acceleration() < v.max_acceleration() {
            rng.gen_range(v.min_acceleration()..=v.max_acceleration())
        } else {
            v.max_acceleration()
        };
        let lane_change = rng.choose(&LaneChange::ALL).copied().unwrap_or_default();
        Decision { acceleration, lane_change, next_lane: random_turn(agent, ctx, rng) }
    }
}

// ── Full speed ────────────────────────────────────────────────────────────────

pub struct FullSpeedMover;

impl Thinkable for FullSpeedMover {
    fn think(&self, agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Decision {
        Decision {
            acceleration: agent.vehicle().max_acceleration(),
            lane_change:  LaneChange::None,
            next_lane:    random_turn(agent, ctx, rng),
        }
    }
}

// ── Idle ──────────────────────────────────────────────────────────────────────

/// Keeps its current velocity and only picks random turns.
pub struct IdleMover;

impl Thinkable for IdleMover {
    fn think(&self, agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Decision {
        Decision {
            acceleration: 0.0,
            lane_change:  LaneChange::None,
            next_lane:    random_turn(agent, ctx, rng),
        }
    }
}

// ── Car following ─────────────────────────────────────────────────────────────

/// Aims for where the leader will be one horizon from now.
///
/// With probability `niggle_chance` the target velocity is scaled by
/// `niggle_factor` (and floored at [`NIGGLE_FLOOR`]), which models the
/// occasional driver who brakes for no reason.  Without a leader the agent
/// accelerates at its maximum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CarFollowingMover {
    pub(crate) niggle_chance: f64,
    pub(crate) niggle_factor: f64,
}

impl CarFollowingMover {
    pub fn new(niggle_chance: f64, niggle_factor: f64) -> BehaviorResult<Self> {
        if !(0.0..=1.0).contains(&niggle_chance) {
            return Err(BehaviorError::Config(format!(
                "niggle chance {niggle_chance} is not a probability"
            )));
        }
        if !(niggle_factor.is_finite() && niggle_factor >= 0.0) {
            return Err(BehaviorError::Config(format!(
                "niggle factor {niggle_factor} must be finite and non-negative"
            )));
        }
        Ok(Self { niggle_chance, niggle_factor })
    }

    /// Target velocity towards the leader's projected position.
    pub fn target_velocity(&self, agent: &Agent, leader: &Agent, rng: &mut AgentRng) -> f64 {
        let projected = leader.position() + leader.velocity() * HORIZON_SECS;
        let candidate = (projected - agent.position()) / HORIZON_SECS;
        if rng.gen_bool(self.niggle_chance) {
            (candidate * self.niggle_factor).max(NIGGLE_FLOOR)
        } else {
            candidate
        }
    }
}

impl Default for CarFollowingMover {
    fn default() -> Self {
        Self {
            niggle_chance: Brain::DEFAULT_NIGGLE_CHANCE,
            niggle_factor: Brain::DEFAULT_NIGGLE_FACTOR,
        }
    }
}

impl Thinkable for CarFollowingMover {
    fn think(&self, agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Decision {
        let acceleration = match leader_of(agent, ctx) {
            Some(leader) => {
                let target = self.target_velocity(agent, leader, rng);
                (target - agent.velocity()) / HORIZON_SECS
            }
            None => agent.vehicle().max_acceleration(),
        };
        Decision {
            acceleration,
            lane_change: LaneChange::None,
            next_lane:   choose_next_lane(agent, ctx, rng),
        }
    }
}

// ── Collision free ────────────────────────────────────────────────────────────

/// Slows down so the gap to the leader's tail is never closed within one
/// horizon.
pub struct CollisionFreeMover;

impl Thinkable for CollisionFreeMover {
    fn think(&self, agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Decision {
        let vehicle = agent.vehicle();
        let acceleration = match leader_of(agent, ctx) {
            Some(leader) => {
                let gap = leader.position() - agent.position() - leader.vehicle().length();
                let target = (gap / HORIZON_SECS).clamp(0.0, vehicle.max_velocity());
                vehicle.clamp_acceleration((target - agent.velocity()) / HORIZON_SECS)
            }
            None => vehicle.max_acceleration(),
        };
        Decision {
            acceleration,
            lane_change: LaneChange::None,
            next_lane:   choose_next_lane(agent, ctx, rng),
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The nearest agent strictly ahead on the same lane.
pub fn leader_of<'a>(agent: &Agent, ctx: &ThinkContext<'a>) -> Option<&'a Agent> {
    let id = ctx.occupancy.leader(agent.lane(), agent.position())?;
    ctx.net.agent(id)
}
