//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::ElementKind;

/// The error type for `ts-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A layer table was built without an assignment for `kind`.
    #[error("element kind {0} has no layer assignment")]
    UnmappedKind(ElementKind),

    #[error("unknown element kind {0:?}")]
    UnknownKind(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ts-core`.
pub type CoreResult<T> = Result<T, CoreError>;
