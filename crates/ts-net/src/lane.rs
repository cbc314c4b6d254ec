//! Lanes — the traversable paths inside an edge.

use ts_core::{EdgeId, ElementKind, LaneId, Shape};

use crate::{NetError, NetResult};

/// One lane of an edge.
///
/// Successor lanes are the lane-level connections declared by the topology
/// source.  They may form cycles at the graph level (ring roads, loops).
#[derive(Clone, Debug)]
pub struct Lane {
    pub id:          LaneId,
    pub name:        String,
    /// Metres per second.
    pub speed_limit: f64,
    /// Metres.
    pub length:      f64,
    /// Centre line.
    pub shape:       Shape,
    edge:            EdgeId,
    index:           usize,
    successors:      Vec<LaneId>,
}

impl Lane {
    pub fn new(
        name:        impl Into<String>,
        edge:        EdgeId,
        index:       usize,
        speed_limit: f64,
        length:      f64,
        shape:       Shape,
    ) -> NetResult<Self> {
        let name = name.into();
        let fail = |reason: String| Err(NetError::construction(ElementKind::Lane, reason));
        if !edge.is_valid() {
            return fail(format!("{name:?} does not belong to an edge"));
        }
        if !(length.is_finite() && length > 0.0) {
            return fail(format!("{name:?} has invalid length {length}"));
        }
        if !(speed_limit.is_finite() && speed_limit >= 0.0) {
            return fail(format!("{name:?} has invalid speed limit {speed_limit}"));
        }
        if shape.is_empty() || !shape.is_finite() {
            return fail(format!("{name:?} needs a non-empty finite shape"));
        }
        Ok(Self {
            id: LaneId::allocate(),
            name,
            speed_limit,
            length,
            shape,
            edge,
            index,
            successors: Vec::new(),
        })
    }

    #[inline]
    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn successors(&self) -> &[LaneId] {
        &self.successors
    }

    /// Record a connection; duplicates are ignored.
    pub(crate) fn add_successor(&mut self, lane: LaneId) {
        if !self.successors.contains(&lane) {
            self.successors.push(lane);
        }
    }
}
