//! `ts-sim` — tick orchestrator for the rust_ts traffic framework.
//!
//! # Three-phase tick loop
//!
//! ```text
//! loop until stop:
//!   ① Drain   — take every queued command; apply each to every element of
//!               its target kind; one report per (command, element) to the sink.
//!   ② Decide  — every agent's behavior reads the start-of-tick registry and
//!               returns a Decision (parallel with the `parallel` feature).
//!               Barrier: all decisions are collected before any is written.
//!   ③ Apply   — simulate layers ascending (agents, lanes, edges, junctions,
//!               flows, net), members in registration order; spawn due
//!               departures; rebuild lane occupancy; publish a snapshot.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`config`]   | `SimConfig`                                                |
//! | [`command`]  | `Command` trait, built-in console commands, line parser    |
//! | [`queue`]    | `CommandSender` (multi-producer queue handle)              |
//! | [`sink`]     | `OutputSink`, `CommandReport`, log/channel/memory sinks    |
//! | [`observer`] | `SimObserver`, `TickSummary`, `NoopObserver`               |
//! | [`stop`]     | `StopSignal`                                               |
//! | [`sim`]      | `Simulation`, `Phase`                                      |
//! | [`builder`]  | `SimBuilder`                                               |
//! | [`error`]    | `SimError`, `CommandError`, `SimResult<T>`                 |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the decide phase on Rayon (default on).           |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ts_net::JsonFiles;
//! use ts_sim::{NoopObserver, SimBuilder, SimConfig, StopSignal};
//!
//! let mut sim = SimBuilder::new(SimConfig::default())
//!     .source(JsonFiles { net: "ring.net.json".into(), routes: None })
//!     .build()?;
//! let console = sim.command_sender();
//! console.send_line("spawn 20");
//! sim.run(&StopSignal::new(), &mut NoopObserver);
//! ```

pub mod builder;
pub mod command;
pub mod config;
pub mod error;
pub mod observer;
pub mod queue;
pub mod sim;
pub mod sink;
pub mod stop;


pub use builder::SimBuilder;
pub use command::{
    Command, CommandContext, CommandOutcome, Info, ListElements, RemoveAgent, Restart, SimTime,
    SpawnRandom, ToggleInterpolation, WallTime, parse_command,
};
pub use config::SimConfig;
pub use error::{CommandError, SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use queue::CommandSender;
pub use sim::{Phase, Simulation};
pub use sink::{ChannelSink, CommandReport, LogSink, MemorySink, OutputSink};
pub use stop::StopSignal;
