//! Directed edges between two junctions.

use ts_core::{EdgeId, ElementKind, JunctionId, LaneId};

use crate::{NetError, NetResult};

/// A directed road segment.  Both endpoints are fixed at construction.
#[derive(Clone, Debug)]
pub struct Edge {
    pub id:       EdgeId,
    pub name:     String,
    /// Higher values are favoured by the router.
    pub priority: i32,
    from:         JunctionId,
    to:           JunctionId,
    /// Lane ids by index; index `i` is at position `i`.
    lanes:        Vec<LaneId>,
}

impl Edge {
    pub fn new(
        name:     impl Into<String>,
        from:     JunctionId,
        to:       JunctionId,
        priority: i32,
    ) -> NetResult<Self> {
        let name = name.into();
        if !from.is_valid() || !to.is_valid() {
            return Err(NetError::construction(
                ElementKind::Edge,
                format!("{name:?} needs both a start and an end junction"),
            ));
        }
        Ok(Self {
            id: EdgeId::allocate(),
            name,
            priority,
            from,
            to,
            lanes: Vec::new(),
        })
    }

    #[inline]
    pub fn from(&self) -> JunctionId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> JunctionId {
        self.to
    }

    pub fn lanes(&self) -> &[LaneId] {
        &self.lanes
    }

    pub fn lane(&self, index: usize) -> Option<LaneId> {
        self.lanes.get(index).copied()
    }

    pub(crate) fn push_lane(&mut self, lane: LaneId) {
        self.lanes.push(lane);
    }
}
