//! `ts-net` — the road graph registry and its entities.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`layers`]    | `Layers<T>` ordered buckets, `LayerError`                 |
//! | [`junction`]  | `Junction`                                                |
//! | [`edge`]      | `Edge`                                                    |
//! | [`lane`]      | `Lane`                                                    |
//! | [`vehicle`]   | `Vehicle` kinematic profile                               |
//! | [`agent`]     | `Agent`, `Decision`, `LaneChange`, `Brain`, `Arrival`     |
//! | [`route`]     | `SpawnInfo`, `DepartureQueue`                             |
//! | [`flow`]      | `Flow` spawn generator                                    |
//! | [`element`]   | `Element` (closed set of registered things)               |
//! | [`net`]       | `Net` registry: arena, name index, layers, R-tree         |
//! | [`motion`]    | apply-phase `simulate_element`, `StepOutcome`             |
//! | [`spawn`]     | `Net::spawn`, `spawn_at_junction`, `spawn_random`         |
//! | [`occupancy`] | `LaneOccupancy` position index                            |
//! | [`snapshot`]  | `SnapshotCell` for reader threads                         |
//! | [`import`]    | JSON topology/route descriptions, `TopologySource`        |
//! | [`error`]     | `NetError`, `ImportError`, result aliases                 |

pub mod agent;
pub mod edge;
pub mod element;
pub mod error;
pub mod flow;
pub mod import;
pub mod junction;
pub mod lane;
pub mod layers;
pub mod motion;
pub mod net;
pub mod occupancy;
pub mod route;
pub mod snapshot;
pub mod spawn;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use agent::{Agent, Arrival, Brain, Decision, LaneChange};
pub use edge::Edge;
pub use element::Element;
pub use error::{ImportError, ImportResult, NetError, NetResult};
pub use flow::Flow;
pub use import::{
    ConnectionDesc, EdgeDesc, FlowDesc, Imported, JsonFiles, JunctionDesc, LaneDesc,
    NetDescription, RouteDescription, RoutePlan, Scenario, TopologySource, VehicleDesc,
    VehicleTypeDesc, import,
};
pub use junction::Junction;
pub use lane::Lane;
pub use layers::{LayerError, Layers};
pub use motion::StepOutcome;
pub use net::Net;
pub use occupancy::LaneOccupancy;
pub use route::{DepartureQueue, SpawnInfo};
pub use snapshot::SnapshotCell;
pub use vehicle::Vehicle;
