//! Per-lane position index for "nearest agent ahead" queries.
//!
//! Each lane keeps a `BTreeSet` of `(position, agent)` slots.  Positions are
//! ordered with `f64::total_cmp`, and the agent id breaks ties so two agents
//! at the same position are both kept.
//!
//! The index is a start-of-tick view: it is rebuilt from the registry after
//! the apply phase (and after any drain that mutated the net), and read
//! concurrently by every behavior during the next decide phase.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::Bound;

use rustc_hash::FxHashMap;

use ts_core::{AgentId, LaneId};

use crate::Net;

#[derive(Copy, Clone, Debug)]
struct Slot {
    position: f64,
    agent:    AgentId,
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .total_cmp(&other.position)
            .then(self.agent.0.cmp(&other.agent.0))
    }
}

/// Agents on each lane, ordered by position.
#[derive(Clone, Debug, Default)]
pub struct LaneOccupancy {
    lanes: FxHashMap<LaneId, BTreeSet<Slot>>,
}

impl LaneOccupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every agent currently registered in `net`.
    pub fn build(net: &Net) -> Self {
        let mut occupancy = Self::new();
        occupancy.rebuild(net);
        occupancy
    }

    /// Drop the old view and re-read all agent positions.
    pub fn rebuild(&mut self, net: &Net) {
        self.lanes.clear();
        for agent in net.agents() {
            self.insert(agent.lane(), agent.position(), agent.id);
        }
    }

    pub fn insert(&mut self, lane: LaneId, position: f64, agent: AgentId) {
        self.lanes.entry(lane).or_default().insert(Slot { position, agent });
    }

    /// The nearest agent strictly ahead of `position` on `lane`.
    pub fn leader(&self, lane: LaneId, position: f64) -> Option<AgentId> {
        let after = Slot { position, agent: AgentId(u64::MAX) };
        self.lanes
            .get(&lane)?
            .range((Bound::Excluded(after), Bound::Unbounded))
            .find(|s| s.position > position)
            .map(|s| s.agent)
    }

    /// The nearest agent strictly behind `position` on `lane`.
    pub fn follower(&self, lane: LaneId, position: f64) -> Option<AgentId> {
        let before = Slot { position, agent: AgentId(0) };
        self.lanes
            .get(&lane)?
            .range((Bound::Unbounded, Bound::Excluded(before)))
            .next_back()
            .map(|s| s.agent)
    }

    /// Agents on `lane` from back to front.
    pub fn agents_on(&self, lane: LaneId) -> impl Iterator<Item = AgentId> + '_ {
        self.lanes.get(&lane).into_iter().flatten().map(|s| s.agent)
    }

    pub fn count(&self, lane: LaneId) -> usize {
        self.lanes.get(&lane).map_or(0, BTreeSet::len)
    }

    /// Total indexed agents.
    pub fn len(&self) -> usize {
        self.lanes.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.values().all(BTreeSet::is_empty)
    }
}
