//! Simulation time model.
//!
//! # Design
//!
//! Ticks are counted with a monotonically increasing `Tick`.  Unlike a
//! fixed-step model, each tick advances simulated time by the *wall-clock*
//! time elapsed since the previous tick ended, multiplied by a time factor:
//!
//!   dt = (tick_start − previous_tick_end) × time_factor
//!
//! A factor of 1.0 runs in real time; 10.0 runs ten times faster.  The first
//! tick has no previous end and therefore a delta of zero.

use std::fmt;
use std::time::{Duration, Instant};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks ticks, accumulated simulated seconds, and wall-clock baselines.
#[derive(Clone, Debug)]
pub struct SimClock {
    /// Multiplier applied to wall-clock deltas.  1.0 = real time.
    pub time_factor: f64,

    current_tick:  Tick,
    sim_elapsed:   f64,
    started:       Instant,
    last_tick_end: Option<Instant>,
}

impl SimClock {
    pub fn new(time_factor: f64) -> Self {
        Self {
            time_factor,
            current_tick:  Tick::ZERO,
            sim_elapsed:   0.0,
            started:       Instant::now(),
            last_tick_end: None,
        }
    }

    /// Start a tick at wall time `now` and return its scaled delta in seconds.
    ///
    /// The delta is zero until a previous tick has ended.
    pub fn begin_tick(&mut self, now: Instant) -> f64 {
        let dt = match self.last_tick_end {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f64() * self.time_factor,
            None => 0.0,
        };
        self.sim_elapsed += dt;
        dt
    }

    /// Start a tick with an explicit simulated delta (stepping, tests).
    pub fn begin_tick_with(&mut self, dt: f64) -> f64 {
        let dt = dt.max(0.0);
        self.sim_elapsed += dt;
        dt
    }

    /// Finish the current tick: record `now` as the next baseline and advance.
    pub fn end_tick(&mut self, now: Instant) {
        self.last_tick_end = Some(now);
        self.current_tick = self.current_tick.offset(1);
    }

    /// Return to tick zero with no baseline, as on a fresh start.
    pub fn reset(&mut self) {
        self.current_tick = Tick::ZERO;
        self.sim_elapsed = 0.0;
        self.started = Instant::now();
        self.last_tick_end = None;
    }

    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Simulated seconds accumulated since the start (or last reset).
    #[inline]
    pub fn sim_elapsed_secs(&self) -> f64 {
        self.sim_elapsed
    }

    /// Wall-clock time since the clock was created (or last reset).
    #[inline]
    pub fn wall_elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3} s simulated)", self.current_tick, self.sim_elapsed)
    }
}
