//! Element kinds and the kind → layer registration table.
//!
//! Every registered element has two fixed layers decided by its kind: a
//! render layer (draw order) and a simulate layer (apply order).  The table
//! is built once at startup and handed to the registry by value; there is no
//! global map to consult.
//!
//! The default table runs the apply phase bottom-up so aggregate layers
//! observe the same tick's agent updates:
//!
//! | Kind     | Render | Simulate |
//! |----------|--------|----------|
//! | Agent    | 3      | 0        |
//! | Lane     | 2      | 1        |
//! | Edge     | 1      | 2        |
//! | Junction | 0      | 3        |
//! | Flow     | 4      | 4        |
//! | Net      | 5      | 5        |

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// An integer bucket key.  Lower layers are processed first.
pub type Layer = i32;

/// The runtime kind of a registered element.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    Junction,
    Edge,
    Lane,
    Agent,
    Flow,
    /// The registry itself, which takes part in the apply phase as the last layer.
    Net,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Junction,
        ElementKind::Edge,
        ElementKind::Lane,
        ElementKind::Agent,
        ElementKind::Flow,
        ElementKind::Net,
    ];

    #[inline]
    fn slot(self) -> usize {
        match self {
            ElementKind::Junction => 0,
            ElementKind::Edge     => 1,
            ElementKind::Lane     => 2,
            ElementKind::Agent    => 3,
            ElementKind::Flow     => 4,
            ElementKind::Net      => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Junction => "junction",
            ElementKind::Edge     => "edge",
            ElementKind::Lane     => "lane",
            ElementKind::Agent    => "agent",
            ElementKind::Flow     => "flow",
            ElementKind::Net      => "net",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        ElementKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownKind(s.to_owned()))
    }
}

// ── LayerTable ────────────────────────────────────────────────────────────────

/// The render and simulate layer of one kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayerAssignment {
    pub render:   Layer,
    pub simulate: Layer,
}

/// Immutable kind → layer mapping covering every [`ElementKind`].
///
/// A table can only be obtained from [`LayerTableBuilder::build`] (which
/// rejects incomplete tables) or [`Default`], so lookups never fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayerTable {
    slots: [LayerAssignment; 6],
}

impl LayerTable {
    pub fn builder() -> LayerTableBuilder {
        LayerTableBuilder::default()
    }

    #[inline]
    pub fn assignment(&self, kind: ElementKind) -> LayerAssignment {
        self.slots[kind.slot()]
    }

    #[inline]
    pub fn render_layer(&self, kind: ElementKind) -> Layer {
        self.slots[kind.slot()].render
    }

    #[inline]
    pub fn simulate_layer(&self, kind: ElementKind) -> Layer {
        self.slots[kind.slot()].simulate
    }
}

impl Default for LayerTable {
    fn default() -> Self {
        let a = |render, simulate| LayerAssignment { render, simulate };
        // Slot order: Junction, Edge, Lane, Agent, Flow, Net.
        Self {
            slots: [a(0, 3), a(1, 2), a(2, 1), a(3, 0), a(4, 4), a(5, 5)],
        }
    }
}

/// Assemble a [`LayerTable`], then call [`build`](Self::build).
#[derive(Default)]
pub struct LayerTableBuilder {
    slots: [Option<LayerAssignment>; 6],
}

impl LayerTableBuilder {
    /// Assign layers to `kind`.  A later call for the same kind wins.
    pub fn set(mut self, kind: ElementKind, render: Layer, simulate: Layer) -> Self {
        self.slots[kind.slot()] = Some(LayerAssignment { render, simulate });
        self
    }

    /// Fails with [`CoreError::UnmappedKind`] for the first kind left unset.
    pub fn build(self) -> CoreResult<LayerTable> {
        let mut slots = [LayerAssignment { render: 0, simulate: 0 }; 6];
        for kind in ElementKind::ALL {
            slots[kind.slot()] = self.slots[kind.slot()].ok_or(CoreError::UnmappedKind(kind))?;
        }
        Ok(LayerTable { slots })
    }
}
