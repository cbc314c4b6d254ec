//! The `TraceWriter` trait implemented by backend writers.

use crate::{AgentTraceRow, OutputResult, TickSummaryRow};

/// A sink for trace rows.
///
/// Errors surface through [`TraceObserver::take_error`](crate::TraceObserver::take_error)
/// because observer callbacks cannot return them.
pub trait TraceWriter {
    /// Write a batch of agent rows.
    fn write_agents(&mut self, rows: &[AgentTraceRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Calling it again after success does nothing.
    fn finish(&mut self) -> OutputResult<()>;
}
