//! Where command results go.
//!
//! | Sink            | Delivery                                            |
//! |-----------------|-----------------------------------------------------|
//! | [`LogSink`]     | `tracing` events (`info!` / `warn!`)                |
//! | [`ChannelSink`] | a crossbeam channel, e.g. back to a console thread  |
//! | [`MemorySink`]  | a shared `Vec`, for tests and embedding             |

use std::fmt;
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{info, warn};

use ts_core::{ElementId, Tick};

use crate::CommandError;

/// The result of applying one command to one element.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandReport {
    pub tick:    Tick,
    /// Command name, or the raw line when it did not parse.
    pub command: String,
    /// `None` when the command never reached an element.
    pub element: Option<ElementId>,
    pub outcome: Result<String, CommandError>,
}

impl CommandReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl fmt::Display for CommandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tick, self.command)?;
        if let Some(element) = self.element {
            write!(f, " {element}")?;
        }
        match &self.outcome {
            Ok(text) => write!(f, ": {text}"),
            Err(e) => write!(f, ": error: {e}"),
        }
    }
}

/// Receives every [`CommandReport`] produced by the drain phase.
pub trait OutputSink: Send {
    fn report(&mut self, report: CommandReport);
}

// ── LogSink ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn report(&mut self, report: CommandReport) {
        match &report.outcome {
            Ok(text) => info!(tick = %report.tick, command = %report.command, "{text}"),
            Err(error) => warn!(tick = %report.tick, command = %report.command, %error, "command failed"),
        }
    }
}

// ── ChannelSink ───────────────────────────────────────────────────────────────

/// Forwards reports to a receiver on another thread.  Reports are dropped
/// once the receiver is gone.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<CommandReport>,
}

impl ChannelSink {
    pub fn new(tx: Sender<CommandReport>) -> Self {
        Self { tx }
    }

    /// A sink and the unbounded receiver it feeds.
    pub fn channel() -> (Self, Receiver<CommandReport>) {
        let (tx, rx) = channel::unbounded();
        (Self { tx }, rx)
    }
}

impl OutputSink for ChannelSink {
    fn report(&mut self, report: CommandReport) {
        let _ = self.tx.send(report);
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// Collects reports; clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<CommandReport>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<CommandReport> {
        std::mem::take(&mut *self.reports.lock())
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl OutputSink for MemorySink {
    fn report(&mut self, report: CommandReport) {
        self.reports.lock().push(report);
    }
}
