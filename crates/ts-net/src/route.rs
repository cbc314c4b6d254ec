//! Route records and the queue of pending departures.

use std::collections::VecDeque;

use ts_core::EdgeId;

use crate::{Brain, Vehicle};

/// Everything needed to materialize one agent at its departure time.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnInfo {
    pub name:             String,
    pub vehicle:          Vehicle,
    pub brain:            Brain,
    /// Edges to drive, first to last.  Never empty.
    pub path:             Vec<EdgeId>,
    /// Simulated seconds since start.
    pub depart_time:      f64,
    pub depart_position:  f64,
    pub depart_speed:     f64,
    /// Metres along the last edge at which the trip is complete.
    pub arrival_position: f64,
    /// Desired speed on arrival.  Carried for behaviors; not used to decide arrival.
    pub arrival_speed:    f64,
}

impl SpawnInfo {
    pub fn start_edge(&self) -> Option<EdgeId> {
        self.path.first().copied()
    }

    pub fn end_edge(&self) -> Option<EdgeId> {
        self.path.last().copied()
    }
}

/// Routes waiting for their departure time, earliest first.
#[derive(Clone, Debug, Default)]
pub struct DepartureQueue {
    pending: VecDeque<SpawnInfo>,
}

impl DepartureQueue {
    pub fn new(mut routes: Vec<SpawnInfo>) -> Self {
        // Stable: equal departure times keep file order.
        routes.sort_by(|a, b| a.depart_time.total_cmp(&b.depart_time));
        Self { pending: routes.into() }
    }

    /// Pop every route with `depart_time <= now`.
    pub fn due(&mut self, now: f64) -> Vec<SpawnInfo> {
        let mut out = Vec::new();
        while self.pending.front().is_some_and(|r| r.depart_time <= now) {
            out.extend(self.pending.pop_front());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
