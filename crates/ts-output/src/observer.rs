//! `TraceObserver<W>` — bridges `SimObserver` to a `TraceWriter`.

use ts_core::Tick;
use ts_net::Net;
use ts_sim::{SimObserver, TickSummary};

use crate::row::{AgentTraceRow, TickSummaryRow};
use crate::writer::TraceWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent traces at snapshot ticks and a summary
/// row for every tick.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct TraceObserver<W: TraceWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: TraceWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result
            && self.last_error.is_none()
        {
            self.last_error = Some(e);
        }
    }
}

/// One row per agent, in registration order.
pub fn agent_rows(tick: Tick, sim_time: f64, net: &Net) -> Vec<AgentTraceRow> {
    net.agents()
        .map(|agent| {
            let world = net.agent_world_position(agent.id);
            AgentTraceRow {
                tick: tick.0,
                sim_time,
                agent_id: agent.id.0,
                lane_id: agent.lane().0,
                position: agent.position(),
                velocity: agent.velocity(),
                x: world.map(|p| p.x),
                y: world.map(|p| p.y),
            }
        })
        .collect()
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(s: &TickSummary) -> Self {
        Self {
            tick:        s.tick.0,
            sim_time:    s.sim_time,
            dt:          s.dt,
            agents:      s.agents as u64,
            moved:       s.moved as u64,
            transferred: s.transferred as u64,
            arrived:     s.arrived as u64,
            exited:      s.exited as u64,
            spawned:     s.spawned as u64,
            failures:    s.failures as u64,
            commands:    s.commands as u64,
        }
    }
}

impl<W: TraceWriter> SimObserver for TraceObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, sim_time: f64, net: &Net) {
        let rows = agent_rows(tick, sim_time, net);
        if !rows.is_empty() {
            let result = self.writer.write_agents(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
