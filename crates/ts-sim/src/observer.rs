//! Simulation observer trait for progress reporting and data collection.

use ts_core::Tick;
use ts_net::Net;

/// Counts gathered while one tick ran.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickSummary {
    pub tick:        Tick,
    /// Simulated seconds this tick advanced.
    pub dt:          f64,
    /// Simulated seconds since start, including this tick.
    pub sim_time:    f64,
    /// Queue entries handled by the drain phase.
    pub commands:    usize,
    /// Agents that produced a decision.
    pub decided:     usize,
    pub moved:       usize,
    pub transferred: usize,
    pub arrived:     usize,
    pub exited:      usize,
    /// Agents created by flows and due departures.
    pub spawned:     usize,
    /// Elements whose apply step failed (logged and skipped).
    pub failures:    usize,
    /// Agents registered when the tick ended.
    pub agents:      usize,
}

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, summary: &TickSummary) {
///         if summary.tick.0 % self.interval == 0 {
///             println!("{}: {} agents", summary.tick, summary.agents);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before the drain phase.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the apply phase.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called every `config.snapshot_interval_ticks` ticks with read-only
    /// access to the registry as the tick left it.
    fn on_snapshot(&mut self, _tick: Tick, _sim_time: f64, _net: &Net) {}

    /// Called once when the loop stops.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
