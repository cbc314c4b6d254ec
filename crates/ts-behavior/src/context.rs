//! Read-only world state passed to every `think` call.

use ts_core::Tick;
use ts_net::{LaneOccupancy, Net};
use ts_router::Gps;

/// The start-of-tick view shared by all agents during the decide phase.
///
/// Built once per tick by the orchestrator.  Nothing here is mutated while a
/// context is alive, so every `think` call may run on any worker thread.
pub struct ThinkContext<'a> {
    /// The tick being decided.
    pub tick:      Tick,

    /// The registry as it stood when the tick started.
    pub net:       &'a Net,

    /// Agents per lane ordered by position; answers "who is ahead of me".
    pub occupancy: &'a LaneOccupancy,

    /// Routing guidance, if the simulation keeps a router.
    pub gps:       Option<&'a Gps>,
}

impl<'a> ThinkContext<'a> {
    #[inline]
    pub fn new(
        tick:      Tick,
        net:       &'a Net,
        occupancy: &'a LaneOccupancy,
        gps:       Option<&'a Gps>,
    ) -> Self {
        Self { tick, net, occupancy, gps }
    }
}
