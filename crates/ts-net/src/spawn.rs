//! Materializing agents from routes, flows, and random requests.

use tracing::debug;

use ts_core::{AgentId, ElementKind, JunctionId, SimRng};

use crate::{Agent, Arrival, Brain, Net, NetError, NetResult, SpawnInfo, Vehicle};

/// Attempts made by [`Net::spawn_random`] before giving up.
const RANDOM_SPAWN_ATTEMPTS: usize = 32;

impl Net {
    /// Place an agent for an imported route: lane 0 of the first edge at the
    /// departure position, arriving at `arrival_position` along the last edge.
    pub fn spawn(&mut self, info: &SpawnInfo) -> NetResult<AgentId> {
        let (Some(start), Some(end)) = (info.start_edge(), info.end_edge()) else {
            return Err(NetError::construction(
                ElementKind::Agent,
                format!("{:?} has an empty path", info.name),
            ));
        };
        let lane_id = self
            .edge(start)
            .ok_or(NetError::UnknownEdge(start))?
            .lane(0)
            .ok_or_else(|| {
                NetError::construction(ElementKind::Agent, format!("start edge {start} has no lanes"))
            })?;
        let lane_len = self.lane(lane_id).ok_or(NetError::UnknownLane(lane_id))?.length;
        let end_len = self.edge_length(end).ok_or(NetError::UnknownEdge(end))?;

        let agent = Agent::new(
            info.name.clone(),
            lane_id,
            info.depart_position.clamp(0.0, lane_len),
            info.depart_speed,
            info.vehicle,
            info.brain,
        )?
        .with_path(info.path.clone())
        .with_arrival(Arrival::EdgePosition {
            edge:     end,
            position: info.arrival_position.clamp(0.0, end_len),
        });
        self.add_agent(agent)
    }

    /// Place an agent at the start of a random lane leaving `from`, bound
    /// for junction `to`.  `Ok(None)` if `from` has no outgoing lanes.
    pub fn spawn_at_junction(
        &mut self,
        name:    impl Into<String>,
        from:    JunctionId,
        to:      JunctionId,
        vehicle: Vehicle,
        brain:   Brain,
        rng:     &mut SimRng,
    ) -> NetResult<Option<AgentId>> {
        if self.junction(from).is_none() {
            return Err(NetError::UnknownJunction(from));
        }
        let lanes: Vec<_> = self.outgoing_lanes(from).collect();
        let Some(&lane) = rng.choose(&lanes) else {
            debug!(junction = %from, "spawn skipped: no outgoing lanes");
            return Ok(None);
        };
        let agent = Agent::new(name, lane, 0.0, 0.0, vehicle, brain)?
            .with_arrival(Arrival::Junction(to));
        self.add_agent(agent).map(Some)
    }

    /// Spawn one agent between two random distinct junctions for which
    /// `reachable(from, to)` holds.  `Ok(None)` if no pair was found.
    pub fn spawn_random(
        &mut self,
        vehicle:   Vehicle,
        brain:     Brain,
        rng:       &mut SimRng,
        reachable: impl Fn(JunctionId, JunctionId) -> bool,
    ) -> NetResult<Option<AgentId>> {
        let sources: Vec<JunctionId> = self
            .junctions()
            .filter(|j| !j.outgoing().is_empty())
            .map(|j| j.id)
            .collect();
        let targets: Vec<JunctionId> = self.junctions().map(|j| j.id).collect();

        for _ in 0..RANDOM_SPAWN_ATTEMPTS {
            let (Some(&from), Some(&to)) = (rng.choose(&sources), rng.choose(&targets)) else {
                return Ok(None);
            };
            if from == to || !reachable(from, to) {
                continue;
            }
            if let Some(agent) = self.spawn_at_junction("random", from, to, vehicle, brain, rng)? {
                return Ok(Some(agent));
            }
        }
        Ok(None)
    }
}
