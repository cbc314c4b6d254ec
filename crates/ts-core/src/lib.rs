//! `ts-core` — foundational types for the `rust_ts` traffic framework.
//!
//! This crate is a dependency of every other `ts-*` crate.  It intentionally
//! has no `ts-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `ElementId` allocator, `JunctionId`, `EdgeId`, `LaneId`, `AgentId`, `FlowId` |
//! | [`geo`]    | `Point2`, `Shape` polyline                                 |
//! | [`kind`]   | `ElementKind`, `LayerTable`, `LayerTableBuilder`           |
//! | [`time`]   | `Tick`, `SimClock` (wall-clock scaled delta time)          |
//! | [`rng`]    | `AgentRng` (per-agent, per-tick), `SimRng` (global)        |
//! | [`error`]  | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, geometry and kinds. |

pub mod error;
pub mod geo;
pub mod ids;
pub mod kind;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{Point2, Shape};
pub use ids::{AgentId, EdgeId, ElementId, FlowId, JunctionId, LaneId};
pub use kind::{ElementKind, Layer, LayerAssignment, LayerTable, LayerTableBuilder};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
