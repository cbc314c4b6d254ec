//! Flows — periodic spawn generators.

use ts_core::{ElementKind, FlowId, JunctionId};

use crate::{Brain, NetError, NetResult, Vehicle};

/// Spawns agents from one junction towards another at a fixed frequency.
///
/// Admission is cumulative: by simulated time `t` the flow has said yes at
/// most `⌊frequency·t⌋ + 1` times, so a late tick catches up on missed
/// spawns one per call instead of bursting.
#[derive(Clone, Debug)]
pub struct Flow {
    pub id:    FlowId,
    pub name:  String,
    vehicle:   Vehicle,
    brain:     Brain,
    from:      JunctionId,
    to:        JunctionId,
    /// Spawns per simulated second.
    frequency: f64,
    spawned:   u64,
    elapsed:   f64,
}

impl Flow {
    pub fn new(
        name:      impl Into<String>,
        vehicle:   Vehicle,
        brain:     Brain,
        from:      JunctionId,
        to:        JunctionId,
        frequency: f64,
    ) -> NetResult<Self> {
        let name = name.into();
        if !from.is_valid() || !to.is_valid() {
            return Err(NetError::construction(
                ElementKind::Flow,
                format!("{name:?} needs a start and an end junction"),
            ));
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(NetError::construction(
                ElementKind::Flow,
                format!("{name:?} has invalid frequency {frequency}"),
            ));
        }
        Ok(Self {
            id: FlowId::allocate(),
            name,
            vehicle,
            brain,
            from,
            to,
            frequency,
            spawned: 0,
            elapsed: 0.0,
        })
    }

    /// Admit one spawn if the count due at `now` has not been reached.
    pub fn is_spawn(&mut self, now: f64) -> bool {
        let due = (self.frequency * now.max(0.0)).floor() as u64 + 1;
        if self.spawned < due {
            self.spawned += 1;
            true
        } else {
            false
        }
    }

    /// Advance the flow's own clock by `dt` and ask [`is_spawn`](Self::is_spawn).
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed += dt.max(0.0);
        self.is_spawn(self.elapsed)
    }

    #[inline]
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    #[inline]
    pub fn from(&self) -> JunctionId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> JunctionId {
        self.to
    }

    #[inline]
    pub fn vehicle(&self) -> Vehicle {
        self.vehicle
    }

    #[inline]
    pub fn brain(&self) -> Brain {
        self.brain
    }
}
