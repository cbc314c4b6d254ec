//! Apply-phase `simulate(dt)` for every element kind.
//!
//! | Kind                           | Effect                                       |
//! |--------------------------------|----------------------------------------------|
//! | Agent                          | lane change, integrate, transfer / arrive    |
//! | Flow                           | admit at most one spawn                      |
//! | Lane, Edge, Junction, Net      | nothing yet; runs after every agent moved    |
//!
//! # Agent step
//!
//! 1. Apply `decision.lane_change` (LEFT = index + 1, RIGHT = index − 1 on
//!    the same edge), clamping position to the new lane's length.
//! 2. `v' = clamp(v + a·dt, v_min, v_max)`, `p' = p + v'·dt`.
//! 3. If an `EdgePosition` arrival on the current edge is reached, remove.
//! 4. If `p' ≥ lane.length`: arrive at a `Junction` target, exit when no
//!    next lane was chosen, or move onto `decision.next_lane` with the
//!    carry-over `p' − length` (clamped to the next lane's length).

use tracing::trace;

use ts_core::{AgentId, ElementId, ElementKind, FlowId, LaneId, SimRng};

use crate::{Arrival, Net, NetError, NetResult};

/// What applying one element did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Nothing to do for this element.
    Idle,
    /// The agent moved along its lane.
    Moved(AgentId),
    /// The agent crossed a junction onto a new lane.
    Transferred { agent: AgentId, from: LaneId, to: LaneId },
    /// The agent met its arrival condition and was removed.
    Arrived(AgentId),
    /// The agent ran off a lane with no chosen successor and was removed.
    Exited(AgentId),
    /// A flow admitted a new agent.
    Spawned(AgentId),
}

impl StepOutcome {
    /// `true` if the step removed an agent from the registry.
    pub fn removed_agent(&self) -> Option<AgentId> {
        match *self {
            StepOutcome::Arrived(a) | StepOutcome::Exited(a) => Some(a),
            _ => None,
        }
    }
}

impl Net {
    /// Run one element's apply step.
    ///
    /// `rng` is only consumed by flows (lane choice at spawn).
    pub fn simulate_element(
        &mut self,
        id: ElementId,
        dt: f64,
        rng: &mut SimRng,
    ) -> NetResult<StepOutcome> {
        if id == self.id() {
            return Ok(StepOutcome::Idle);
        }
        let kind = self.element(id).map(|e| e.kind()).ok_or(NetError::UnknownElement(id))?;
        match kind {
            ElementKind::Agent => self.simulate_agent(AgentId(id.0), dt),
            ElementKind::Flow => self.simulate_flow(FlowId(id.0), dt, rng),
            ElementKind::Lane | ElementKind::Edge | ElementKind::Junction | ElementKind::Net => {
                Ok(StepOutcome::Idle)
            }
        }
    }

    pub fn simulate_agent(&mut self, id: AgentId, dt: f64) -> NetResult<StepOutcome> {
        let agent = self.agent(id).ok_or(NetError::UnknownAgent(id))?;
        let mut lane_id = agent.lane();

        // ── Lane change ───────────────────────────────────────────────────
        if let Some(target) = self.adjacent_lane(lane_id, agent.decision.lane_change) {
            let target_len = self.lane(target).ok_or(NetError::UnknownLane(target))?.length;
            let agent = self.agent_mut(id).ok_or(NetError::UnknownAgent(id))?;
            let position = agent.position().min(target_len);
            agent.place(target, position);
            lane_id = target;
        }

        let lane = self.lane(lane_id).ok_or(NetError::UnknownLane(lane_id))?;
        let lane_len = lane.length;
        let edge_id = lane.edge();
        let ahead = self.edge(edge_id).ok_or(NetError::UnknownEdge(edge_id))?.to();

        // ── Integrate ─────────────────────────────────────────────────────
        let agent = self.agent_mut(id).ok_or(NetError::UnknownAgent(id))?;
        let position = agent.integrate(dt);
        let next = agent.decision.next_lane;
        let arrival = agent.arrival();

        if let Some(Arrival::EdgePosition { edge, position: at }) = arrival
            && edge == edge_id
            && position >= at.min(lane_len)
        {
            self.remove_agent(id)?;
            return Ok(StepOutcome::Arrived(id));
        }
        if position < lane_len {
            return Ok(StepOutcome::Moved(id));
        }
        if arrival == Some(Arrival::Junction(ahead)) {
            self.remove_agent(id)?;
            return Ok(StepOutcome::Arrived(id));
        }
        let Some(next) = next else {
            trace!(agent = %id, lane = %lane_id, "no next lane; leaving the network");
            self.remove_agent(id)?;
            return Ok(StepOutcome::Exited(id));
        };

        // ── Transfer ──────────────────────────────────────────────────────
        let target = self
            .lane(next)
            .filter(|l| self.edge(l.edge()).is_some_and(|e| e.from() == ahead))
            .map(|l| (l.edge(), l.length));
        let Some((next_edge, next_len)) = target else {
            // Keep the position invariant even when the decision was bad.
            if let Some(agent) = self.agent_mut(id) {
                agent.place(lane_id, lane_len);
            }
            return Err(NetError::InvalidTransition { agent: id, lane: next });
        };
        let carry = (position - lane_len).min(next_len);
        let agent = self.agent_mut(id).ok_or(NetError::UnknownAgent(id))?;
        agent.enter(next, next_edge, carry);
        Ok(StepOutcome::Transferred { agent: id, from: lane_id, to: next })
    }

    pub fn simulate_flow(
        &mut self,
        id: FlowId,
        dt: f64,
        rng: &mut SimRng,
    ) -> NetResult<StepOutcome> {
        let flow = self.flow_mut(id).ok_or(NetError::UnknownFlow(id))?;
        if !flow.advance(dt) {
            return Ok(StepOutcome::Idle);
        }
        let name = format!("{}.{}", flow.name, flow.spawned() - 1);
        let (from, to, vehicle, brain) = (flow.from(), flow.to(), flow.vehicle(), flow.brain());
        Ok(match self.spawn_at_junction(name, from, to, vehicle, brain, rng)? {
            Some(agent) => StepOutcome::Spawned(agent),
            None => StepOutcome::Idle,
        })
    }
}
