//! `ts-behavior` — the decide-phase contract and built-in motion policies.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                         |
//! |-------------|------------------------------------------------------------------|
//! | [`context`] | `ThinkContext<'a>` — start-of-tick view shared by all agents     |
//! | [`model`]   | `Thinkable` trait                                                |
//! | [`movers`]  | `RandomMover`, `FullSpeedMover`, `IdleMover`, `CarFollowingMover`, `CollisionFreeMover` |
//! | [`turn`]    | uniform and guided next-lane choice                              |
//! | [`brain`]   | `Thinkable for Brain` dispatch, `decide`, `validate_brain`       |
//! | [`error`]   | `BehaviorError`, `BehaviorResult<T>`                             |
//!
//! # Design notes
//!
//! The tick loop in ts-sim works as follows:
//!
//! 1. **Decide phase** (parallel): for every agent call [`decide`], which
//!    reads only the [`ThinkContext`] and returns a `Decision` by value.
//!
//! 2. **Apply phase** (sequential): the collected decisions are written into
//!    each agent's slot, then the registry integrates layer by layer.
//!
//! Policies therefore only need to be `Send + Sync`; they never hold mutable
//! state.

pub mod brain;
pub mod context;
pub mod error;
pub mod model;
pub mod movers;
pub mod turn;


pub use brain::{decide, validate_brain};
pub use context::ThinkContext;
pub use error::{BehaviorError, BehaviorResult};
pub use model::Thinkable;
pub use movers::{
    CarFollowingMover, CollisionFreeMover, FullSpeedMover, IdleMover, RandomMover, leader_of,
};
