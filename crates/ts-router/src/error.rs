//! Router error type.
//!
//! An unreachable destination is not an error: it is `None` from
//! [`Gps::next_edge`](crate::Gps::next_edge) and `Ok(None)` from
//! [`Gps::route`](crate::Gps::route).

use thiserror::Error;

use ts_core::JunctionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("junction {0} was not part of the net at the last router update")]
    UnknownJunction(JunctionId),

    #[error("predecessor chain from {from} is broken at {junction}")]
    BrokenTree { from: JunctionId, junction: JunctionId },
}

pub type RouterResult<T> = Result<T, RouterError>;
