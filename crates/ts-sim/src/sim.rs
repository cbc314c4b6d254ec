//! The `Simulation` struct and its tick loop.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use ts_behavior::{ThinkContext, decide};
use ts_core::{AgentId, ElementId, SimClock, SimRng, Tick};
use ts_net::{
    Decision, DepartureQueue, Imported, LaneOccupancy, Net, SnapshotCell, StepOutcome,
    TopologySource, import,
};
use ts_router::Gps;

use crate::command::{Command, CommandContext};
use crate::queue::{CommandQueue, Queued};
use crate::{
    CommandError, CommandReport, CommandSender, OutputSink, SimConfig, SimError, SimObserver,
    SimResult, StopSignal, TickSummary,
};

/// Which part of a tick is running.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    /// Between ticks.
    #[default]
    Idle,
    Drain,
    Decide,
    Apply,
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// The tick orchestrator.
///
/// Each tick runs three phases in strict order:
///
/// 1. **Drain**: every command queued so far is applied to every element of
///    its target kind.  Each (command, element) pair reports separately to
///    the output sink.
/// 2. **Decide** (parallel with the `parallel` feature): every agent's
///    behavior reads the start-of-tick registry and returns a `Decision`.
///    All decisions are collected before any is written back.
/// 3. **Apply** (sequential): simulate layers in ascending order, members of
///    a layer in registration order.  Due departures are spawned last, then
///    the lane occupancy index is rebuilt and a snapshot published.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    /// Global configuration (seed, time factor, cadence, …).
    pub config: SimConfig,

    /// Tick counter and scaled delta time.
    pub clock: SimClock,

    net:        Net,
    occupancy:  LaneOccupancy,
    gps:        Gps,
    departures: DepartureQueue,
    rng:        SimRng,

    commands:    CommandQueue,
    sink:        Box<dyn OutputSink>,
    source:      Option<Box<dyn TopologySource>>,
    snapshots:   SnapshotCell,
    phase:       Phase,
    interpolate: bool,

    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Simulation {
    pub(crate) fn assemble(
        config:     SimConfig,
        net:        Net,
        departures: DepartureQueue,
        sink:       Box<dyn OutputSink>,
        source:     Option<Box<dyn TopologySource>>,
        #[cfg(feature = "parallel")] pool: Option<rayon::ThreadPool>,
    ) -> Self {
        let occupancy = LaneOccupancy::build(&net);
        let gps = Gps::build(&net);
        let snapshots = SnapshotCell::new(net.clone());
        Self {
            clock: SimClock::new(config.time_factor),
            rng: SimRng::new(config.seed),
            config,
            net,
            occupancy,
            gps,
            departures,
            commands: CommandQueue::new(),
            sink,
            source,
            snapshots,
            phase: Phase::Idle,
            interpolate: false,
            #[cfg(feature = "parallel")]
            pool,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn net(&self) -> &Net {
        &self.net
    }

    /// Direct registry access between ticks.  Call
    /// [`update_routes`](Self::update_routes) after changing topology.
    pub fn net_mut(&mut self) -> &mut Net {
        &mut self.net
    }

    pub fn occupancy(&self) -> &LaneOccupancy {
        &self.occupancy
    }

    pub fn gps(&self) -> &Gps {
        &self.gps
    }

    pub fn departures(&self) -> &DepartureQueue {
        &self.departures
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether renderers should interpolate positions between ticks.
    pub fn interpolation(&self) -> bool {
        self.interpolate
    }

    /// A handle for queueing commands from other threads.
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Commands waiting for the next drain.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// A handle readers can [`load`](SnapshotCell::load) from any thread.
    pub fn snapshots(&self) -> SnapshotCell {
        self.snapshots.clone()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Recompute the router after a topology change.
    pub fn update_routes(&mut self) {
        self.gps.update(&self.net);
    }

    /// Rebuild the occupancy index after mutating agents through
    /// [`net_mut`](Self::net_mut).
    pub fn refresh_occupancy(&mut self) {
        self.occupancy.rebuild(&self.net);
    }

    /// Run one tick whose delta is the scaled wall time since the last one.
    pub fn tick(&mut self) -> TickSummary {
        let dt = self.clock.begin_tick(Instant::now());
        self.finish_tick(dt)
    }

    /// Run one tick with an explicit simulated delta.
    pub fn step(&mut self, dt: f64) -> TickSummary {
        let dt = self.clock.begin_tick_with(dt);
        self.finish_tick(dt)
    }

    /// Run exactly `n` ticks of `dt` seconds each.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, dt: f64, observer: &mut O) {
        for _ in 0..n {
            observer.on_tick_start(self.clock.current_tick());
            let summary = self.step(dt);
            self.notify(&summary, observer);
        }
    }

    /// Tick at the configured cadence until `stop` is raised.
    ///
    /// The flag is checked between ticks; the tick in progress always
    /// completes.  Returns the tick the loop stopped at.
    pub fn run<O: SimObserver>(&mut self, stop: &StopSignal, observer: &mut O) -> Tick {
        let interval = Duration::from_millis(self.config.tick_interval_ms);
        info!(interval_ms = self.config.tick_interval_ms, "simulation loop started");
        while !stop.is_stopped() {
            let started = Instant::now();
            observer.on_tick_start(self.clock.current_tick());
            let summary = self.tick();
            self.notify(&summary, observer);

            let spent = started.elapsed();
            if spent < interval {
                std::thread::sleep(interval - spent);
            }
        }
        let last = self.clock.current_tick();
        observer.on_sim_end(last);
        info!(tick = %last, "simulation loop stopped");
        last
    }

    /// Reload topology and routes from the attached source.
    ///
    /// The new world is imported in full before anything is replaced, so a
    /// failed reload leaves the running simulation untouched.
    pub fn restart(&mut self) -> SimResult<()> {
        let source = self.source.as_deref().ok_or(SimError::NoSource)?;
        let Imported { net, departures } =
            import(source, *self.net.layer_table(), self.config.default_brain)?;

        self.net = net;
        self.departures = departures;
        self.occupancy.rebuild(&self.net);
        self.gps.update(&self.net);
        self.clock.reset();
        self.rng = SimRng::new(self.config.seed);
        if self.config.publish_snapshots {
            self.snapshots.publish(&self.net);
        }
        info!(elements = self.net.len(), departures = self.departures.len(), "simulation restarted");
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn notify<O: SimObserver>(&self, summary: &TickSummary, observer: &mut O) {
        observer.on_tick_end(summary);
        let every = self.config.snapshot_interval_ticks;
        if every > 0 && summary.tick.0 % every == 0 {
            observer.on_snapshot(summary.tick, summary.sim_time, &self.net);
        }
    }

    fn finish_tick(&mut self, dt: f64) -> TickSummary {
        let tick = self.clock.current_tick();
        let mut summary = TickSummary { tick, dt, ..TickSummary::default() };

        self.phase = Phase::Drain;
        let (commands, restarted) = self.drain(tick);
        summary.commands = commands;
        // A reload mid-tick starts the new world from zero elapsed time.
        if restarted {
            summary.tick = self.clock.current_tick();
            summary.dt = 0.0;
        }

        self.phase = Phase::Decide;
        summary.decided = self.decide(summary.tick);

        self.phase = Phase::Apply;
        self.apply(&mut summary);

        self.phase = Phase::Idle;
        summary.sim_time = self.clock.sim_elapsed_secs();
        summary.agents = self.net.agent_count();
        self.clock.end_tick(Instant::now());

        debug!(
            tick = %summary.tick,
            dt = summary.dt,
            agents = summary.agents,
            moved = summary.moved,
            transferred = summary.transferred,
            removed = summary.arrived + summary.exited,
            "tick complete",
        );
        summary
    }

    /// Apply every queued command.  Returns the number handled and whether
    /// the world was reloaded.
    fn drain(&mut self, tick: Tick) -> (usize, bool) {
        let queued = self.commands.take();
        let handled = queued.len();
        let mut restarted = false;
        for item in queued {
            match item {
                Queued::Run(command) => restarted |= self.execute(tick, command),
                Queued::Rejected { line, error } => {
                    self.sink.report(CommandReport {
                        tick,
                        command: line,
                        element: None,
                        outcome: Err(error),
                    });
                }
            }
        }
        if handled > 0 && !restarted {
            self.occupancy.rebuild(&self.net);
        }
        (handled, restarted)
    }

    /// Run one command against every element of its target kind.
    fn execute(&mut self, tick: Tick, mut command: Box<dyn Command>) -> bool {
        let name = command.name().to_owned();
        let targets: Vec<ElementId> = self.net.ids_of_kind(command.target());
        let mut restart = false;

        for element in targets {
            // An earlier element of the same command may have removed it.
            if !self.net.contains(element) {
                continue;
            }
            let mut ctx = CommandContext {
                net:         &mut self.net,
                clock:       &self.clock,
                gps:         &self.gps,
                rng:         &mut self.rng,
                config:      &self.config,
                interpolate: &mut self.interpolate,
                restart:     &mut restart,
            };
            let outcome = command.execute(element, &mut ctx);
            if let Err(error) = &outcome {
                warn!(command = %name, element = %element, %error, "command failed for element");
            }
            self.sink.report(CommandReport { tick, command: name.clone(), element: Some(element), outcome });
        }

        if !restart {
            return false;
        }
        match self.restart() {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "restart failed; keeping the current world");
                self.sink.report(CommandReport {
                    tick,
                    command: name,
                    element: None,
                    outcome: Err(CommandError::Failed(error.to_string())),
                });
                false
            }
        }
    }

    /// Collect every agent's decision from the start-of-tick registry, then
    /// write them back.  Returns the number of agents decided.
    fn decide(&mut self, tick: Tick) -> usize {
        let seed = self.config.seed;
        let decisions: Vec<(AgentId, Decision)> = {
            let ctx = ThinkContext::new(tick, &self.net, &self.occupancy, Some(&self.gps));
            let agents: Vec<_> = self.net.agents().collect();

            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;

                let fan_out = || {
                    agents
                        .par_iter()
                        .map(|agent| (agent.id, decide(agent, &ctx, seed)))
                        .collect::<Vec<_>>()
                };
                match &self.pool {
                    Some(pool) => pool.install(fan_out),
                    None => fan_out(),
                }
            }

            #[cfg(not(feature = "parallel"))]
            {
                agents
                    .iter()
                    .map(|agent| (agent.id, decide(agent, &ctx, seed)))
                    .collect()
            }
        };

        // Every decision exists before the first one is written.
        let decided = decisions.len();
        for (agent, decision) in decisions {
            self.net.set_decision(agent, decision);
        }
        decided
    }

    fn apply(&mut self, summary: &mut TickSummary) {
        let dt = summary.dt;
        let layers: Vec<_> = self.net.simulate_layers().layers_ascending().collect();
        for layer in layers {
            let members: Vec<ElementId> = self.net.simulate_layers().items_of(layer).copied().collect();
            for element in members {
                if !self.net.contains(element) {
                    continue;
                }
                match self.net.simulate_element(element, dt, &mut self.rng) {
                    Ok(outcome) => record(summary, outcome),
                    Err(error) => {
                        summary.failures += 1;
                        warn!(element = %element, layer, %error, "apply step failed");
                    }
                }
            }
        }

        for route in self.departures.due(self.clock.sim_elapsed_secs()) {
            match self.net.spawn(&route) {
                Ok(_) => summary.spawned += 1,
                Err(error) => {
                    summary.failures += 1;
                    warn!(route = %route.name, %error, "departure failed");
                }
            }
        }

        self.occupancy.rebuild(&self.net);
        if self.config.publish_snapshots {
            self.snapshots.publish(&self.net);
        }
    }
}

fn record(summary: &mut TickSummary, outcome: StepOutcome) {
    match outcome {
        StepOutcome::Idle => {}
        StepOutcome::Moved(_) => summary.moved += 1,
        StepOutcome::Transferred { .. } => summary.transferred += 1,
        StepOutcome::Arrived(_) => summary.arrived += 1,
        StepOutcome::Exited(_) => summary.exited += 1,
        StepOutcome::Spawned(_) => summary.spawned += 1,
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("clock", &self.clock)
            .field("phase", &self.phase)
            .field("elements", &self.net.len())
            .field("agents", &self.net.agent_count())
            .field("departures", &self.departures.len())
            .field("pending_commands", &self.commands.len())
            .finish()
    }
}
