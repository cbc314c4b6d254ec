//! Junctions — the vertices of the road graph.

use ts_core::{EdgeId, ElementKind, JunctionId, Point2, Shape};

use crate::{NetError, NetResult};

/// A point where edges meet.
///
/// The outgoing edge list is filled by the registry as edges are added, in
/// insertion order; it cannot be edited from outside the crate.
#[derive(Clone, Debug)]
pub struct Junction {
    pub id:       JunctionId,
    /// External id from the topology source.
    pub name:     String,
    pub position: Point2,
    /// Outline used for rendering and hit-testing.
    pub shape:    Shape,
    outgoing:     Vec<EdgeId>,
}

impl Junction {
    /// Build a junction with a freshly allocated id.
    ///
    /// Fails if the position is not finite or the shape is empty.
    pub fn new(name: impl Into<String>, position: Point2, shape: Shape) -> NetResult<Self> {
        let name = name.into();
        if !position.is_finite() {
            return Err(NetError::construction(
                ElementKind::Junction,
                format!("{name:?} has a non-finite position"),
            ));
        }
        if shape.is_empty() || !shape.is_finite() {
            return Err(NetError::construction(
                ElementKind::Junction,
                format!("{name:?} needs a non-empty finite shape"),
            ));
        }
        Ok(Self {
            id: JunctionId::allocate(),
            name,
            position,
            shape,
            outgoing: Vec::new(),
        })
    }

    /// Outgoing edges in insertion order.
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub(crate) fn push_outgoing(&mut self, edge: EdgeId) {
        self.outgoing.push(edge);
    }
}
