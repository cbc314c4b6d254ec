//! `ts-router` — precomputed routing guidance over the road graph.
//!
//! # Crate layout
//!
//! | Module    | Contents                                         |
//! |-----------|--------------------------------------------------|
//! | [`gps`]   | `Gps` all-pairs Dijkstra trees, `Route`          |
//! | [`error`] | `RouterError`, `RouterResult<T>`                 |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | (default) per-source trees computed on the Rayon pool.  |

pub mod error;
pub mod gps;


pub use error::{RouterError, RouterResult};
pub use gps::{Gps, Route, edge_cost_mm};
