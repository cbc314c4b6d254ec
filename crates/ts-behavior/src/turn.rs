//! Turn choice: which lane to take at the junction ahead.
//!
//! [`random_turn`] picks a uniformly random outgoing edge, then a uniformly
//! random lane of it.  The random, full-speed and idle movers use it.
//!
//! [`choose_next_lane`] is the guided chooser of the following movers:
//!
//! | Order | Source                                  | Lane on the chosen edge         |
//! |-------|-----------------------------------------|---------------------------------|
//! | 1     | the agent's planned path                | a connected lane, else random   |
//! | 2     | `Gps::next_edge` towards its destination | a connected lane, else random   |
//! | 3     | uniformly random outgoing edge          | uniformly random                |
//!
//! `None` means the junction ahead is a dead end; the agent will leave the
//! network when it reaches the end of its lane.

use ts_core::{AgentRng, EdgeId, JunctionId, LaneId};
use ts_net::Agent;

use crate::ThinkContext;

/// The junction the agent's current lane leads into.
pub fn junction_ahead(agent: &Agent, ctx: &ThinkContext<'_>) -> Option<JunctionId> {
    let lane = ctx.net.lane(agent.lane())?;
    ctx.net.edge(lane.edge()).map(|e| e.to())
}

/// Uniform turn at the junction ahead, ignoring path and destination.
pub fn random_turn(agent: &Agent, ctx: &ThinkContext<'_>, rng: &mut AgentRng) -> Option<LaneId> {
    let ahead = junction_ahead(agent, ctx)?;
    random_lane(ctx.net.junction(ahead)?.outgoing(), ctx, rng)
}

/// Pick the lane to enter after the current one, following the planned
/// path or the router when either has an answer.
pub fn choose_next_lane(
    agent: &Agent,
    ctx:   &ThinkContext<'_>,
    rng:   &mut AgentRng,
) -> Option<LaneId> {
    let ahead = junction_ahead(agent, ctx)?;
    let outgoing = ctx.net.junction(ahead)?.outgoing();
    if outgoing.is_empty() {
        return None;
    }

    let guided = agent
        .planned_next_edge()
        .filter(|e| outgoing.contains(e))
        .or_else(|| {
            let gps = ctx.gps?;
            let destination = agent.destination()?;
            gps.next_edge(ahead, destination)
        });
    if let Some(edge) = guided
        && let Some(lane) = lane_on_edge(agent, ctx, edge, rng)
    {
        return Some(lane);
    }

    random_lane(outgoing, ctx, rng)
}

/// A lane of `edge`, preferring ones the current lane connects to.
fn lane_on_edge(
    agent: &Agent,
    ctx:   &ThinkContext<'_>,
    edge:  EdgeId,
    rng:   &mut AgentRng,
) -> Option<LaneId> {
    let lanes = ctx.net.edge(edge)?.lanes();
    let connected: Vec<LaneId> = ctx
        .net
        .lane(agent.lane())
        .map(|l| l.successors().iter().copied().filter(|s| lanes.contains(s)).collect())
        .unwrap_or_default();
    match rng.choose(&connected) {
        Some(&lane) => Some(lane),
        None => rng.choose(lanes).copied(),
    }
}

/// Uniform edge, then uniform lane of that edge.
pub fn random_lane(
    outgoing: &[EdgeId],
    ctx:      &ThinkContext<'_>,
    rng:      &mut AgentRng,
) -> Option<LaneId> {
    let &edge = rng.choose(outgoing)?;
    let lanes = ctx.net.edge(edge)?.lanes();
    rng.choose(lanes).copied()
}
