//! Agents, their per-tick decisions, and the behavior selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ts_core::{AgentId, EdgeId, ElementKind, JunctionId, LaneId};

use crate::{NetError, NetResult, Vehicle};

// ── Decision ──────────────────────────────────────────────────────────────────

/// Requested lateral move for the next apply phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneChange {
    #[default]
    None,
    /// Towards the lane with the next higher index.
    Left,
    /// Towards the lane with the next lower index.
    Right,
}

impl LaneChange {
    pub const ALL: [LaneChange; 3] = [LaneChange::None, LaneChange::Left, LaneChange::Right];
}

/// Scratch output of an agent's behavior, rewritten every tick and consumed
/// by the apply phase.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Decision {
    /// Unclamped, m/s².  The vehicle's velocity bounds apply on integration.
    pub acceleration: f64,
    pub lane_change:  LaneChange,
    /// Lane to enter when the current lane runs out.
    pub next_lane:    Option<LaneId>,
}

// ── Brain ─────────────────────────────────────────────────────────────────────

/// Which behavior drives an agent.  Chosen when the agent is created.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Brain {
    /// Uniformly random acceleration, lane change, and turn.
    Random,
    /// Always accelerates at the vehicle maximum.
    FullSpeed,
    /// Keeps its velocity; only picks turns.
    Idle,
    /// Follows the agent ahead, occasionally braking hard.
    CarFollowing {
        niggle_chance: f64,
        niggle_factor: f64,
    },
    /// Keeps a stopping gap to the agent ahead.
    CollisionFree,
}

impl Brain {
    pub const DEFAULT_NIGGLE_CHANCE: f64 = 0.5;
    pub const DEFAULT_NIGGLE_FACTOR: f64 = 0.1;

    /// Car-following with the default niggle parameters.
    pub fn car_following() -> Self {
        Brain::CarFollowing {
            niggle_chance: Self::DEFAULT_NIGGLE_CHANCE,
            niggle_factor: Self::DEFAULT_NIGGLE_FACTOR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Brain::Random             => "random",
            Brain::FullSpeed          => "full-speed",
            Brain::Idle               => "idle",
            Brain::CarFollowing { .. } => "car-following",
            Brain::CollisionFree      => "collision-free",
        }
    }
}

impl Default for Brain {
    fn default() -> Self {
        Brain::car_following()
    }
}

impl fmt::Display for Brain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Brain {
    type Err = NetError;

    fn from_str(s: &str) -> NetResult<Self> {
        match s.trim() {
            "random"         => Ok(Brain::Random),
            "full-speed"     => Ok(Brain::FullSpeed),
            "idle"           => Ok(Brain::Idle),
            "car-following"  => Ok(Brain::car_following()),
            "collision-free" => Ok(Brain::CollisionFree),
            other => Err(NetError::construction(
                ElementKind::Agent,
                format!("unknown behavior {other:?}"),
            )),
        }
    }
}

// ── Arrival ───────────────────────────────────────────────────────────────────

/// When an agent has reached the end of its trip.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Arrival {
    /// Reached the end of a lane that leads into this junction.
    Junction(JunctionId),
    /// Reached `position` metres along any lane of `edge`.
    EdgePosition { edge: EdgeId, position: f64 },
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// A simulated vehicle occupying exactly one lane.
///
/// Position and lane are only changed by the registry's apply step, which
/// keeps `position` within `[0, lane.length]`.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id:       AgentId,
    pub name:     String,
    /// Written by the decide phase, read by the next apply.
    pub decision: Decision,
    lane:         LaneId,
    position:     f64,
    velocity:     f64,
    vehicle:      Vehicle,
    brain:        Brain,
    arrival:      Option<Arrival>,
    /// Planned edges; `path[path_cursor]` is the edge currently driven.
    path:         Vec<EdgeId>,
    path_cursor:  usize,
}

impl Agent {
    pub fn new(
        name:     impl Into<String>,
        lane:     LaneId,
        position: f64,
        velocity: f64,
        vehicle:  Vehicle,
        brain:    Brain,
    ) -> NetResult<Self> {
        let name = name.into();
        if !lane.is_valid() {
            return Err(NetError::construction(ElementKind::Agent, format!("{name:?} has no lane")));
        }
        if !(position.is_finite() && position >= 0.0) || !velocity.is_finite() {
            return Err(NetError::construction(
                ElementKind::Agent,
                format!("{name:?} has invalid position {position} or velocity {velocity}"),
            ));
        }
        Ok(Self {
            id: AgentId::allocate(),
            name,
            decision: Decision::default(),
            lane,
            position,
            velocity: vehicle.clamp_velocity(velocity),
            vehicle,
            brain,
            arrival: None,
            path: Vec::new(),
            path_cursor: 0,
        })
    }

    pub fn with_arrival(mut self, arrival: Arrival) -> Self {
        self.arrival = Some(arrival);
        self
    }

    /// Attach a planned edge sequence whose first edge holds the start lane.
    pub fn with_path(mut self, path: Vec<EdgeId>) -> Self {
        self.path = path;
        self.path_cursor = 0;
        self
    }

    #[inline]
    pub fn lane(&self) -> LaneId {
        self.lane
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    #[inline]
    pub fn brain(&self) -> Brain {
        self.brain
    }

    #[inline]
    pub fn arrival(&self) -> Option<Arrival> {
        self.arrival
    }

    pub fn path(&self) -> &[EdgeId] {
        &self.path
    }

    /// Target junction for router guidance, if the trip ends at one.
    pub fn destination(&self) -> Option<JunctionId> {
        match self.arrival {
            Some(Arrival::Junction(j)) => Some(j),
            _ => None,
        }
    }

    /// The edge after the one currently driven, according to the plan.
    pub fn planned_next_edge(&self) -> Option<EdgeId> {
        self.path.get(self.path_cursor + 1).copied()
    }

    /// Integrate one step from the current decision and return the new
    /// unclamped position.
    ///
    /// `v' = clamp(v + a·dt, v_min, v_max)`, `p' = p + v'·dt`.
    pub(crate) fn integrate(&mut self, dt: f64) -> f64 {
        self.velocity = self.vehicle.clamp_velocity(self.velocity + self.decision.acceleration * dt);
        self.position += self.velocity * dt;
        self.position
    }

    pub(crate) fn place(&mut self, lane: LaneId, position: f64) {
        self.lane = lane;
        self.position = position;
    }

    /// Move onto `lane` of `edge`, advancing the plan if `edge` is its next step.
    pub(crate) fn enter(&mut self, lane: LaneId, edge: EdgeId, position: f64) {
        if self.planned_next_edge() == Some(edge) {
            self.path_cursor += 1;
        }
        self.place(lane, position);
    }
}
