//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use ts_behavior::validate_brain;
use ts_net::{Brain, Vehicle};

use crate::{SimError, SimResult};

/// Settings for one [`Simulation`](crate::Simulation).
///
/// Every field has a default, so a config file only needs to name what it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the global RNG and every per-agent, per-tick RNG.
    pub seed:                    u64,

    /// Multiplier from wall-clock to simulated seconds.  1.0 = real time.
    pub time_factor:             f64,

    /// Target wall-clock spacing between tick starts in [`run`](crate::Simulation::run).
    /// 0 runs ticks back to back.
    pub tick_interval_ms:        u64,

    /// Decide-phase worker threads.  `None` uses Rayon's global pool.
    pub num_threads:             Option<usize>,

    /// Publish a registry snapshot for reader threads after every tick.
    pub publish_snapshots:       bool,

    /// Call [`SimObserver::on_snapshot`](crate::SimObserver::on_snapshot)
    /// every this many ticks.  0 disables it.
    pub snapshot_interval_ticks: u64,

    /// Profile of vehicles created by the `spawn` command.
    pub default_vehicle:         Vehicle,

    /// Behavior of spawned vehicles and of imported vehicle types that name none.
    pub default_brain:           Brain,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                    0,
            time_factor:             1.0,
            tick_interval_ms:        50,
            num_threads:             None,
            publish_snapshots:       true,
            snapshot_interval_ticks: 0,
            default_vehicle:         Vehicle::default(),
            default_brain:           Brain::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.time_factor.is_finite() && self.time_factor >= 0.0) {
            return Err(SimError::Config(format!(
                "time factor {} must be finite and non-negative",
                self.time_factor
            )));
        }
        if self.num_threads == Some(0) {
            return Err(SimError::Config("num_threads must be at least 1".into()));
        }
        validate_brain(self.default_brain)?;
        Ok(())
    }
}
