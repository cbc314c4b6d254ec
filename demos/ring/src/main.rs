//! ring — smallest interactive example for the rust_ts traffic framework.
//!
//! Runs a two-lane ring road with a shortcut while a scripted console thread
//! plays the role of an operator.  It issues a few commands, restarts the
//! world, and then stops the loop.
//! Command reports arrive on a channel and are printed by a reader thread;
//! agent traces and tick summaries are written as CSV.
//!
//! `RUST_LOG=ts_sim=debug cargo run -p ring` shows one line per tick.
//! An optional first argument names a JSON `SimConfig` used instead of the
//! constants below; fields it leaves out take their defaults.

mod network;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ts_core::Tick;
use ts_net::Net;
use ts_output::{CsvWriter, TraceObserver, TraceWriter};
use ts_sim::{ChannelSink, SimBuilder, SimConfig, SimObserver, StopSignal, TickSummary};

use network::ring_scenario;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                    u64   = 42;
const TIME_FACTOR:             f64   = 5.0; // 5 simulated seconds per wall second
const TICK_INTERVAL_MS:        u64   = 20;
const SNAPSHOT_INTERVAL_TICKS: u64   = 10;
const OUTPUT_DIR:              &str  = "output/ring";

/// Console script: (wall-clock pause before the line, line).
const SCRIPT: &[(u64, &str)] = &[
    (200, "simtime"),
    (100, "spawn 12"),
    (300, "list flow"),
    (300, "interpolate"),
    (200, "walltime"),
    (500, "list agent"),
    (200, "teleport 3"),
    (300, "restart"),
    (400, "simtime"),
];

// ── Counting wrapper ──────────────────────────────────────────────────────────

/// Forwards to the trace observer and keeps a few totals for the summary.
struct CountingObserver<W: TraceWriter> {
    inner:       TraceObserver<W>,
    ticks:       u64,
    trace_rows:  usize,
    spawned:     usize,
    arrived:     usize,
    peak_agents: usize,
}

impl<W: TraceWriter> CountingObserver<W> {
    fn new(inner: TraceObserver<W>) -> Self {
        Self { inner, ticks: 0, trace_rows: 0, spawned: 0, arrived: 0, peak_agents: 0 }
    }
}

impl<W: TraceWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.ticks += 1;
        self.spawned += summary.spawned;
        self.arrived += summary.arrived;
        self.peak_agents = self.peak_agents.max(summary.agents);
        self.inner.on_tick_end(summary);
    }

    fn on_snapshot(&mut self, tick: Tick, sim_time: f64, net: &Net) {
        self.trace_rows += net.agent_count();
        self.inner.on_snapshot(tick, sim_time, net);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Config file ───────────────────────────────────────────────────────────────

fn load_config(path: &Path) -> Result<SimConfig> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config: SimConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), "config loaded");
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Config.
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => SimConfig {
            seed:                    SEED,
            time_factor:             TIME_FACTOR,
            tick_interval_ms:        TICK_INTERVAL_MS,
            snapshot_interval_ticks: SNAPSHOT_INTERVAL_TICKS,
            ..SimConfig::default()
        },
    };

    println!("=== ring — rust_ts traffic simulation ===");
    println!(
        "Seed: {}  |  Time factor: {}  |  Tick interval: {} ms",
        config.seed, config.time_factor, config.tick_interval_ms
    );
    println!();

    // 2. Build sim.  The scenario stays attached so `restart` can reload it.
    let (sink, reports) = ChannelSink::channel();
    let mut sim = SimBuilder::new(config).source(ring_scenario()).sink(sink).build()?;
    println!(
        "Network: {} elements, {} departures queued",
        sim.net().len(),
        sim.departures().len()
    );
    println!();

    // 3. Report printer.  Ends when the simulation drops the sink.
    let printer = thread::spawn(move || {
        for report in reports {
            println!("  {report}");
        }
    });

    // 4. Scripted console.
    let stop = StopSignal::new();
    let console = {
        let sender = sim.command_sender();
        let stop = stop.clone();
        thread::spawn(move || {
            for &(pause_ms, line) in SCRIPT {
                thread::sleep(Duration::from_millis(pause_ms));
                println!("> {line}");
                if !sender.send_line(line) {
                    break;
                }
            }
            thread::sleep(Duration::from_millis(300));
            stop.stop();
        })
    };

    // 5. Snapshot reader: peeks at the published registry while the loop runs.
    let watcher = {
        let snapshots = sim.snapshots();
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.is_stopped() {
                thread::sleep(Duration::from_millis(750));
                let net = snapshots.load();
                info!(agents = net.agent_count(), "snapshot");
            }
        })
    };

    // 6. Output.
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(TraceObserver::new(writer));

    // 7. Run until the console raises the stop signal.
    let t0 = Instant::now();
    let last = sim.run(&stop, &mut obs);
    let elapsed = t0.elapsed();

    if console.join().is_err() {
        eprintln!("console thread panicked");
    }
    if watcher.join().is_err() {
        eprintln!("snapshot thread panicked");
    }
    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 8. Summary.
    println!();
    println!("Stopped at {last} after {:.3} s wall time ({})", elapsed.as_secs_f64(), sim.clock);
    println!("  ticks run          : {}", obs.ticks);
    println!("  vehicles spawned   : {}", obs.spawned);
    println!("  vehicles arrived   : {}", obs.arrived);
    println!("  peak agents        : {}", obs.peak_agents);
    println!("  agent_trace.csv    : {} rows", obs.trace_rows);
    println!("  tick_summaries.csv : {} rows", obs.ticks);
    println!();

    // 9. Final agent table.
    println!("{:<12} {:<12} {:>9} {:>9}", "Agent", "Lane", "Pos (m)", "Vel (m/s)");
    println!("{}", "-".repeat(45));
    let net = sim.net();
    for agent in net.agents() {
        let lane = net.lane(agent.lane()).map_or("?", |l| l.name.as_str());
        println!(
            "{:<12} {:<12} {:>9.2} {:>9.2}",
            agent.name,
            lane,
            agent.position(),
            agent.velocity()
        );
    }

    // Dropping the simulation closes the report channel.
    drop(sim);
    if printer.join().is_err() {
        eprintln!("report printer panicked");
    }

    Ok(())
}
