//! `Element` — the closed set of things the registry owns.
//!
//! There is deliberately no `PartialEq` here: elements are identified by
//! their id, never by comparing fields.

use ts_core::{ElementId, ElementKind};

use crate::{Agent, Edge, Flow, Junction, Lane};

#[derive(Clone, Debug)]
pub enum Element {
    Junction(Junction),
    Edge(Edge),
    Lane(Lane),
    Agent(Agent),
    Flow(Flow),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Junction(_) => ElementKind::Junction,
            Element::Edge(_)     => ElementKind::Edge,
            Element::Lane(_)     => ElementKind::Lane,
            Element::Agent(_)    => ElementKind::Agent,
            Element::Flow(_)     => ElementKind::Flow,
        }
    }

    pub fn id(&self) -> ElementId {
        match self {
            Element::Junction(j) => j.id.into(),
            Element::Edge(e)     => e.id.into(),
            Element::Lane(l)     => l.id.into(),
            Element::Agent(a)    => a.id.into(),
            Element::Flow(f)     => f.id.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Element::Junction(j) => &j.name,
            Element::Edge(e)     => &e.name,
            Element::Lane(l)     => &l.name,
            Element::Agent(a)    => &a.name,
            Element::Flow(f)     => &f.name,
        }
    }

    /// One-line human-readable summary, used by the `info` command.
    pub fn describe(&self) -> String {
        match self {
            Element::Junction(j) => format!(
                "junction {} {:?} at {} with {} outgoing edge(s)",
                j.id, j.name, j.position, j.outgoing().len()
            ),
            Element::Edge(e) => format!(
                "edge {} {:?} {} -> {} priority {} with {} lane(s)",
                e.id, e.name, e.from(), e.to(), e.priority, e.lanes().len()
            ),
            Element::Lane(l) => format!(
                "lane {} {:?} index {} of {} length {:.2} m speed {:.2} m/s, {} successor(s)",
                l.id, l.name, l.index(), l.edge(), l.length, l.speed_limit, l.successors().len()
            ),
            Element::Agent(a) => format!(
                "agent {} {:?} ({}) on {} at {:.2} m, {:.2} m/s",
                a.id, a.name, a.brain(), a.lane(), a.position(), a.velocity()
            ),
            Element::Flow(f) => format!(
                "flow {} {:?} {} -> {} at {:.3}/s, {} spawned",
                f.id, f.name, f.from(), f.to(), f.frequency(), f.spawned()
            ),
        }
    }
}

macro_rules! element_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Element {
                fn from(e: $variant) -> Self {
                    Element::$variant(e)
                }
            }
        )*
    };
}

element_from!(Junction, Edge, Lane, Agent, Flow);
