//! `ts-output` — trace writers for the rust_ts traffic framework.
//!
//! | Backend | Files created                            |
//! |---------|------------------------------------------|
//! | CSV     | `agent_trace.csv`, `tick_summaries.csv`  |
//!
//! Backends implement [`TraceWriter`] and are driven by [`TraceObserver`],
//! which implements `ts_sim::SimObserver`: a summary row every tick, agent
//! rows every `snapshot_interval_ticks`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ts_output::{CsvWriter, TraceObserver};
//!
//! let mut obs = TraceObserver::new(CsvWriter::new(Path::new("./output"))?);
//! sim.run(&stop, &mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{TraceObserver, agent_rows};
pub use row::{AgentTraceRow, TickSummaryRow};
pub use writer::TraceWriter;
