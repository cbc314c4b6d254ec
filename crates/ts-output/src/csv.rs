//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_trace.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::TraceWriter;
use crate::{AgentTraceRow, OutputResult, TickSummaryRow};

pub const AGENT_TRACE_FILE: &str = "agent_trace.csv";
pub const TICK_SUMMARY_FILE: &str = "tick_summaries.csv";

const AGENT_HEADER: [&str; 8] =
    ["tick", "sim_time", "agent_id", "lane_id", "position", "velocity", "x", "y"];

const SUMMARY_HEADER: [&str; 11] = [
    "tick", "sim_time", "dt", "agents", "moved", "transferred", "arrived", "exited", "spawned",
    "failures", "commands",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    agents:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut agents = Writer::from_path(dir.join(AGENT_TRACE_FILE))?;
        agents.write_record(AGENT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join(TICK_SUMMARY_FILE))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self { agents, summaries, finished: false })
    }
}

fn coordinate(c: Option<f64>) -> String {
    c.map(|v| format!("{v:.3}")).unwrap_or_default()
}

impl TraceWriter for CsvWriter {
    fn write_agents(&mut self, rows: &[AgentTraceRow]) -> OutputResult<()> {
        for row in rows {
            self.agents.write_record(&[
                row.tick.to_string(),
                format!("{:.3}", row.sim_time),
                row.agent_id.to_string(),
                row.lane_id.to_string(),
                format!("{:.3}", row.position),
                format!("{:.3}", row.velocity),
                coordinate(row.x),
                coordinate(row.y),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            format!("{:.3}", row.sim_time),
            format!("{:.3}", row.dt),
            row.agents.to_string(),
            row.moved.to_string(),
            row.transferred.to_string(),
            row.arrived.to_string(),
            row.exited.to_string(),
            row.spawned.to_string(),
            row.failures.to_string(),
            row.commands.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.agents.flush()?;
        self.summaries.flush()?;
        self.finished = true;
        Ok(())
    }
}
