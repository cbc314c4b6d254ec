//! Plain data row types written by output backends.

/// One agent's state at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentTraceRow {
    pub tick:     u64,
    pub sim_time: f64,
    pub agent_id: u64,
    pub lane_id:  u64,
    /// Metres from the start of the lane.
    pub position: f64,
    pub velocity: f64,
    /// World coordinates along the lane shape; `None` for lanes without one.
    pub x:        Option<f64>,
    pub y:        Option<f64>,
}

/// Counts for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:        u64,
    pub sim_time:    f64,
    pub dt:          f64,
    pub agents:      u64,
    pub moved:       u64,
    pub transferred: u64,
    pub arrived:     u64,
    pub exited:      u64,
    pub spawned:     u64,
    pub failures:    u64,
    pub commands:    u64,
}
