//! `Net` — the graph registry.
//!
//! # Ownership
//!
//! The registry is the sole owner of every junction, edge, lane, agent, and
//! flow (arena + index).  Entities refer to each other only through typed
//! ids, so the junction ↔ edge ↔ lane ↔ agent cycles and lane-successor loops
//! never become ownership cycles.
//!
//! # Indexes
//!
//! | Index             | Purpose                                             |
//! |-------------------|-----------------------------------------------------|
//! | `elements`        | id → element                                        |
//! | `order`           | registration order, for stable per-kind iteration   |
//! | `names`           | (kind, external id) → element, topology + flows     |
//! | `render_layers`   | draw order                                          |
//! | `simulate_layers` | apply order; also holds the net's own id            |
//! | `junction_index`  | R-tree over junction positions for picking          |
//!
//! Mutation is only valid from the thread driving the tick loop.  Other
//! threads read a published [`Snapshot`][crate::SnapshotCell] instead.

use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ts_core::{
    AgentId, EdgeId, ElementId, ElementKind, FlowId, JunctionId, LaneId, Layer, LayerTable,
    Point2,
};

use crate::{
    Agent, Decision, Edge, Element, Flow, Junction, Lane, LaneChange, Layers, NetError, NetResult,
};

/// Drop `id` from the bucket it was added to.
///
/// Every registered element sits in the layer its kind maps to, so a missing
/// layer or entry means the registry's indexes disagree.  That is fatal.
pub(crate) fn unregister(layers: &mut Layers<ElementId>, layer: Layer, id: ElementId) {
    match layers.remove(layer, &id) {
        Ok(true) => {}
        Ok(false) => panic!("registry invariant broken: {id} is not in layer {layer}"),
        Err(error) => panic!("registry invariant broken while removing {id}: {error}"),
    }
}

// ── R-tree junction entry ─────────────────────────────────────────────────────

#[derive(Clone)]
struct JunctionEntry {
    point: [f64; 2],
    id:    JunctionId,
}

impl RTreeObject for JunctionEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for JunctionEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Net ───────────────────────────────────────────────────────────────────────

/// Owns all graph entities and indexes them by id, by name, and by layer.
///
/// `Clone` produces an independent structural copy, which is how immutable
/// snapshots are made.
#[derive(Clone)]
pub struct Net {
    id:              ElementId,
    layer_table:     LayerTable,
    elements:        FxHashMap<ElementId, Element>,
    order:           Vec<ElementId>,
    names:           FxHashMap<(ElementKind, String), ElementId>,
    render_layers:   Layers<ElementId>,
    simulate_layers: Layers<ElementId>,
    junction_index:  RTree<JunctionEntry>,
}

impl Net {
    /// An empty registry.  The net registers itself in its own layers so the
    /// apply phase reaches it after every other kind.
    pub fn new(layer_table: LayerTable) -> Self {
        let id = ElementId::allocate();
        let own = layer_table.assignment(ElementKind::Net);
        let mut render_layers = Layers::new();
        let mut simulate_layers = Layers::new();
        render_layers.add(own.render, id);
        simulate_layers.add(own.simulate, id);
        Self {
            id,
            layer_table,
            elements: FxHashMap::default(),
            order: Vec::new(),
            names: FxHashMap::default(),
            render_layers,
            simulate_layers,
            junction_index: RTree::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[inline]
    pub fn layer_table(&self) -> &LayerTable {
        &self.layer_table
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register `element` by id and append it to its render and simulate
    /// layer buckets.
    ///
    /// References are checked first: edges need both junctions, lanes need
    /// their edge (and must take the next free index), agents need their
    /// lane, flows need both junctions.  On error nothing is changed.
    pub fn add_element(&mut self, element: impl Into<Element>) -> NetResult<ElementId> {
        let element = element.into();
        let id = element.id();
        let kind = element.kind();
        if id == self.id || self.elements.contains_key(&id) {
            return Err(NetError::AlreadyRegistered(id));
        }
        let name_key = (kind != ElementKind::Agent).then(|| (kind, element.name().to_owned()));
        if let Some(key) = &name_key
            && self.names.contains_key(key)
        {
            return Err(NetError::DuplicateName { kind, name: key.1.clone() });
        }

        self.check_references(&element)?;
        self.link(&element);

        if let Element::Junction(j) = &element {
            self.junction_index.insert(JunctionEntry {
                point: [j.position.x, j.position.y],
                id:    j.id,
            });
        }
        let layers = self.layer_table.assignment(kind);
        self.render_layers.add(layers.render, id);
        self.simulate_layers.add(layers.simulate, id);
        if let Some(key) = name_key {
            self.names.insert(key, id);
        }
        self.order.push(id);
        self.elements.insert(id, element);
        Ok(id)
    }

    pub fn add_junction(&mut self, junction: Junction) -> NetResult<JunctionId> {
        let id = junction.id;
        self.add_element(junction)?;
        Ok(id)
    }

    pub fn add_edge(&mut self, edge: Edge) -> NetResult<EdgeId> {
        let id = edge.id;
        self.add_element(edge)?;
        Ok(id)
    }

    pub fn add_lane(&mut self, lane: Lane) -> NetResult<LaneId> {
        let id = lane.id;
        self.add_element(lane)?;
        Ok(id)
    }

    pub fn add_agent(&mut self, agent: Agent) -> NetResult<AgentId> {
        let id = agent.id;
        self.add_element(agent)?;
        Ok(id)
    }

    pub fn add_flow(&mut self, flow: Flow) -> NetResult<FlowId> {
        let id = flow.id;
        self.add_element(flow)?;
        Ok(id)
    }

    /// Declare a lane-level connection `from → to`.
    pub fn connect(&mut self, from: LaneId, to: LaneId) -> NetResult<()> {
        if self.lane(to).is_none() {
            return Err(NetError::UnknownLane(to));
        }
        self.lane_mut(from).ok_or(NetError::UnknownLane(from))?.add_successor(to);
        Ok(())
    }

    fn check_references(&self, element: &Element) -> NetResult<()> {
        match element {
            Element::Junction(_) => Ok(()),
            Element::Edge(e) => {
                for j in [e.from(), e.to()] {
                    if self.junction(j).is_none() {
                        return Err(NetError::UnknownJunction(j));
                    }
                }
                Ok(())
            }
            Element::Lane(l) => {
                let edge = self.edge(l.edge()).ok_or(NetError::UnknownEdge(l.edge()))?;
                let expected = edge.lanes().len();
                if l.index() != expected {
                    return Err(NetError::LaneIndex { edge: edge.id, expected, got: l.index() });
                }
                Ok(())
            }
            Element::Agent(a) => self.lane(a.lane()).map(|_| ()).ok_or(NetError::UnknownLane(a.lane())),
            Element::Flow(f) => {
                for j in [f.from(), f.to()] {
                    if self.junction(j).is_none() {
                        return Err(NetError::UnknownJunction(j));
                    }
                }
                Ok(())
            }
        }
    }

    /// Attach cross-links.  Only called after `check_references` passed.
    fn link(&mut self, element: &Element) {
        match element {
            Element::Edge(e) => {
                if let Some(j) = self.junction_mut(e.from()) {
                    j.push_outgoing(e.id);
                }
            }
            Element::Lane(l) => {
                if let Some(edge) = self.edge_mut(l.edge()) {
                    edge.push_lane(l.id);
                }
            }
            Element::Junction(_) | Element::Agent(_) | Element::Flow(_) => {}
        }
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Unregister an agent or flow.  Topology elements are fixed after
    /// import and fail with [`NetError::Immutable`].
    pub fn remove_element(&mut self, id: ElementId) -> NetResult<Element> {
        let kind = self.element(id).map(Element::kind).ok_or(NetError::UnknownElement(id))?;
        if !matches!(kind, ElementKind::Agent | ElementKind::Flow) {
            return Err(NetError::Immutable(kind));
        }
        let layers = self.layer_table.assignment(kind);
        unregister(&mut self.render_layers, layers.render, id);
        unregister(&mut self.simulate_layers, layers.simulate, id);
        self.order.retain(|&x| x != id);
        let element = self.elements.remove(&id).ok_or(NetError::UnknownElement(id))?;
        if kind != ElementKind::Agent {
            self.names.remove(&(kind, element.name().to_owned()));
        }
        Ok(element)
    }

    pub fn remove_agent(&mut self, id: AgentId) -> NetResult<Agent> {
        if self.agent(id).is_none() {
            return Err(NetError::UnknownAgent(id));
        }
        match self.remove_element(id.element())? {
            Element::Agent(agent) => Ok(agent),
            other => Err(NetError::Immutable(other.kind())),
        }
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        id == self.id || self.elements.contains_key(&id)
    }

    pub fn junction(&self, id: JunctionId) -> Option<&Junction> {
        match self.elements.get(&id.element()) {
            Some(Element::Junction(j)) => Some(j),
            _ => None,
        }
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        match self.elements.get(&id.element()) {
            Some(Element::Edge(e)) => Some(e),
            _ => None,
        }
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        match self.elements.get(&id.element()) {
            Some(Element::Lane(l)) => Some(l),
            _ => None,
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        match self.elements.get(&id.element()) {
            Some(Element::Agent(a)) => Some(a),
            _ => None,
        }
    }

    pub fn flow(&self, id: FlowId) -> Option<&Flow> {
        match self.elements.get(&id.element()) {
            Some(Element::Flow(f)) => Some(f),
            _ => None,
        }
    }

    fn junction_mut(&mut self, id: JunctionId) -> Option<&mut Junction> {
        match self.elements.get_mut(&id.element()) {
            Some(Element::Junction(j)) => Some(j),
            _ => None,
        }
    }

    fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        match self.elements.get_mut(&id.element()) {
            Some(Element::Edge(e)) => Some(e),
            _ => None,
        }
    }

    fn lane_mut(&mut self, id: LaneId) -> Option<&mut Lane> {
        match self.elements.get_mut(&id.element()) {
            Some(Element::Lane(l)) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        match self.elements.get_mut(&id.element()) {
            Some(Element::Agent(a)) => Some(a),
            _ => None,
        }
    }

    pub(crate) fn flow_mut(&mut self, id: FlowId) -> Option<&mut Flow> {
        match self.elements.get_mut(&id.element()) {
            Some(Element::Flow(f)) => Some(f),
            _ => None,
        }
    }

    /// Overwrite an agent's decision slot.  Returns `false` if the agent is gone.
    pub fn set_decision(&mut self, id: AgentId, decision: Decision) -> bool {
        match self.agent_mut(id) {
            Some(agent) => {
                agent.decision = decision;
                true
            }
            None => false,
        }
    }

    /// Resolve an external id within one kind.
    pub fn find(&self, kind: ElementKind, name: &str) -> Option<ElementId> {
        self.names.get(&(kind, name.to_owned())).copied()
    }

    pub fn find_junction(&self, name: &str) -> Option<JunctionId> {
        self.find(ElementKind::Junction, name).map(|id| JunctionId(id.0))
    }

    pub fn find_edge(&self, name: &str) -> Option<EdgeId> {
        self.find(ElementKind::Edge, name).map(|id| EdgeId(id.0))
    }

    pub fn find_lane(&self, name: &str) -> Option<LaneId> {
        self.find(ElementKind::Lane, name).map(|id| LaneId(id.0))
    }

    pub fn find_flow(&self, name: &str) -> Option<FlowId> {
        self.find(ElementKind::Flow, name).map(|id| FlowId(id.0))
    }

    // ── Iteration ─────────────────────────────────────────────────────────

    /// All elements in registration order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Elements of `kind` in registration order.  Call again to restart.
    pub fn elements_of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Element> + '_ {
        self.elements().filter(move |e| e.kind() == kind)
    }

    /// Ids of every current element of `kind`; for [`ElementKind::Net`] this
    /// is the registry's own id.
    pub fn ids_of_kind(&self, kind: ElementKind) -> Vec<ElementId> {
        match kind {
            ElementKind::Net => vec![self.id],
            _ => self.elements_of_kind(kind).map(Element::id).collect(),
        }
    }

    pub fn junctions(&self) -> impl Iterator<Item = &Junction> + '_ {
        self.elements().filter_map(|e| match e {
            Element::Junction(j) => Some(j),
            _ => None,
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.elements().filter_map(|e| match e {
            Element::Edge(x) => Some(x),
            _ => None,
        })
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> + '_ {
        self.elements().filter_map(|e| match e {
            Element::Lane(l) => Some(l),
            _ => None,
        })
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.elements().filter_map(|e| match e {
            Element::Agent(a) => Some(a),
            _ => None,
        })
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> + '_ {
        self.elements().filter_map(|e| match e {
            Element::Flow(f) => Some(f),
            _ => None,
        })
    }

    /// Number of registered elements, not counting the net itself.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn agent_count(&self) -> usize {
        self.agents().count()
    }

    // ── Layers ────────────────────────────────────────────────────────────

    pub fn render_layers(&self) -> &Layers<ElementId> {
        &self.render_layers
    }

    pub fn simulate_layers(&self) -> &Layers<ElementId> {
        &self.simulate_layers
    }

    /// Every id (including the net's) in ascending render layer order.
    pub fn render_order(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.render_layers.iter().map(|(_, &id)| id)
    }

    // ── Geometry helpers ──────────────────────────────────────────────────

    /// Routing length of an edge: the length of its first lane.
    pub fn edge_length(&self, edge: EdgeId) -> Option<f64> {
        let lane = self.edge(edge)?.lane(0)?;
        self.lane(lane).map(|l| l.length)
    }

    /// The neighbour of `lane` on the same edge in direction `change`.
    pub fn adjacent_lane(&self, lane: LaneId, change: LaneChange) -> Option<LaneId> {
        let lane = self.lane(lane)?;
        let edge = self.edge(lane.edge())?;
        match change {
            LaneChange::None  => None,
            LaneChange::Left  => edge.lane(lane.index() + 1),
            LaneChange::Right => lane.index().checked_sub(1).and_then(|i| edge.lane(i)),
        }
    }

    /// Every lane of every edge leaving `junction`, grouped by edge.
    pub fn outgoing_lanes(&self, junction: JunctionId) -> impl Iterator<Item = LaneId> + '_ {
        self.junction(junction)
            .into_iter()
            .flat_map(|j| j.outgoing().iter())
            .filter_map(|&e| self.edge(e))
            .flat_map(|e| e.lanes().iter().copied())
    }

    /// Nearest junction to `p` by position.
    pub fn nearest_junction(&self, p: Point2) -> Option<JunctionId> {
        self.junction_index.nearest_neighbor(&[p.x, p.y]).map(|e| e.id)
    }

    /// The closest junction whose shape bounds contain `p`.
    pub fn junction_at(&self, p: Point2) -> Option<JunctionId> {
        self.junction_index
            .nearest_neighbor_iter(&[p.x, p.y])
            .map(|e| e.id)
            .find(|&id| self.junction(id).is_some_and(|j| j.shape.bounds_contain(p)))
    }

    /// World coordinates of an agent, interpolated along its lane shape.
    pub fn agent_world_position(&self, id: AgentId) -> Option<Point2> {
        let agent = self.agent(id)?;
        self.lane(agent.lane())?.shape.point_at(agent.position())
    }
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("id", &self.id)
            .field("elements", &self.elements.len())
            .field("agents", &self.agent_count())
            .finish()
    }
}
