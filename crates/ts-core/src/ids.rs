//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every graph element draws its id from one process-wide monotonic counter,
//! so an id is unique across kinds and across reloads of the network.  The
//! typed wrappers (`LaneId`, `AgentId`, …) carry the same integer as the
//! element's [`ElementId`] and convert into it with `From`.
//!
//! All ids are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Identity is the integer and nothing
//! else; two elements with equal fields are still different elements.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next value handed out by [`ElementId::allocate`].
static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of any registered element (including the network itself).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u64);

impl ElementId {
    /// Sentinel meaning "no valid ID".  Never returned by `allocate`.
    pub const INVALID: ElementId = ElementId(0);

    /// Draw the next id from the process-wide counter.
    #[inline]
    pub fn allocate() -> Self {
        ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generate a typed ID wrapper that shares the `ElementId` number space.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u64);

        impl $name {
            /// Sentinel meaning "no valid ID"; same value as `ElementId::INVALID`.
            pub const INVALID: $name = $name(0);

            /// Draw a fresh id from the process-wide element counter.
            #[inline]
            pub fn allocate() -> Self {
                $name(ElementId::allocate().0)
            }

            /// The untyped registry id of this element.
            #[inline(always)]
            pub fn element(self) -> ElementId {
                ElementId(self.0)
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for ElementId {
            #[inline(always)]
            fn from(id: $name) -> ElementId {
                ElementId(id.0)
            }
        }
    };
}

typed_id! {
    /// A junction (graph vertex).
    pub struct JunctionId;
}

typed_id! {
    /// A directed edge between two junctions.
    pub struct EdgeId;
}

typed_id! {
    /// One lane of an edge.
    pub struct LaneId;
}

typed_id! {
    /// A simulated vehicle.
    pub struct AgentId;
}

typed_id! {
    /// A periodic spawn generator.
    pub struct FlowId;
}
