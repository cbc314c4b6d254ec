//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! The decide phase runs in parallel, so an agent's randomness must not
//! depend on which worker thread evaluates it or in which order.  Each agent
//! gets a fresh `SmallRng` every tick, seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT) XOR (tick * TICK_MIX)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! This means:
//!
//! - Agents never share RNG state (no contention, no ordering dependency).
//! - No RNG state has to be stored on the agent or threaded through the
//!   registry between ticks.
//! - All RNG calls are local to the owning thread; no synchronisation needed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, Tick};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Second odd constant so agent and tick contributions don't cancel.
const TICK_MIX: u64 = 0xc2b2_ae3d_27d4_eb4f;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Built on the stack inside the decide phase and dropped at the end of the
/// agent's `think` call.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed from the global seed, the agent, and the tick being decided.
    pub fn for_tick(global_seed: u64, agent: AgentId, tick: Tick) -> Self {
        let seed = global_seed
            ^ agent.0.wrapping_mul(MIXING_CONSTANT)
            ^ tick.0.wrapping_add(1).wrapping_mul(TICK_MIX);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for random spawns and flow lane selection.
///
/// Used only on the tick-loop thread.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
