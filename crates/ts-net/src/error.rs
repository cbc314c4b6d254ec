//! Registry and import error types.

use thiserror::Error;

use ts_core::{AgentId, EdgeId, ElementId, ElementKind, FlowId, JunctionId, LaneId};

/// Errors produced while constructing entities or mutating the registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetError {
    /// An entity was built from missing or invalid fields.
    #[error("cannot construct {kind}: {reason}")]
    Construction { kind: ElementKind, reason: String },

    #[error("junction {0} not found")]
    UnknownJunction(JunctionId),

    #[error("edge {0} not found")]
    UnknownEdge(EdgeId),

    #[error("lane {0} not found")]
    UnknownLane(LaneId),

    #[error("agent {0} not found")]
    UnknownAgent(AgentId),

    #[error("flow {0} not found")]
    UnknownFlow(FlowId),

    #[error("element {0} not found")]
    UnknownElement(ElementId),

    #[error("element {0} is already registered")]
    AlreadyRegistered(ElementId),

    #[error("{kind} name {name:?} is already taken")]
    DuplicateName { kind: ElementKind, name: String },

    #[error("lane index {got} on edge {edge} breaks contiguity (expected {expected})")]
    LaneIndex { edge: EdgeId, expected: usize, got: usize },

    #[error("{0} elements are fixed after import and cannot be removed")]
    Immutable(ElementKind),

    #[error("agent {agent} cannot enter lane {lane}: it does not leave the junction ahead")]
    InvalidTransition { agent: AgentId, lane: LaneId },
}

impl NetError {
    pub(crate) fn construction(kind: ElementKind, reason: impl Into<String>) -> Self {
        NetError::Construction { kind, reason: reason.into() }
    }
}

pub type NetResult<T> = Result<T, NetError>;

/// Errors produced by topology and route import.  Any of these aborts the
/// whole import; no partially populated registry is returned.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} {name:?} is referenced but was never declared")]
    UnknownReference { kind: ElementKind, name: String },

    #[error("edge {edge:?} declares lane index {got} where {expected} was expected")]
    LaneIndex { edge: String, expected: usize, got: usize },

    #[error("vehicle type {0:?} is not declared")]
    UnknownVehicleType(String),

    #[error("vehicle {0:?} has an empty route")]
    EmptyRoute(String),

    #[error("route of vehicle {vehicle:?} is not connected at edge {edge:?}")]
    DisconnectedRoute { vehicle: String, edge: String },

    #[error(transparent)]
    Net(#[from] NetError),
}

pub type ImportResult<T> = Result<T, ImportError>;
