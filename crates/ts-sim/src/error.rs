use thiserror::Error;

use ts_behavior::BehaviorError;
use ts_core::{CoreError, ElementId, ElementKind};
use ts_net::{ImportError, NetError};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("registry error: {0}")]
    Net(#[from] NetError),

    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error("invalid behavior: {0}")]
    Behavior(#[from] BehaviorError),

    #[error("could not build the decide thread pool: {0}")]
    ThreadPool(String),

    #[error("restart needs a topology source, but none is attached")]
    NoSource,
}

pub type SimResult<T> = Result<T, SimError>;

/// Why a console command did not produce output.
///
/// Reported to the output sink; never stops the tick loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{command}: {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("{0}")]
    Failed(String),

    #[error("{command} cannot be applied to {kind} elements")]
    Unsupported { command: String, kind: ElementKind },
}

impl CommandError {
    pub(crate) fn invalid(command: &str, reason: impl Into<String>) -> Self {
        CommandError::InvalidArgument { command: command.to_owned(), reason: reason.into() }
    }
}

impl From<NetError> for CommandError {
    fn from(e: NetError) -> Self {
        match e {
            NetError::UnknownAgent(id)   => CommandError::ElementNotFound(id.element()),
            NetError::UnknownElement(id) => CommandError::ElementNotFound(id),
            other                        => CommandError::Failed(other.to_string()),
        }
    }
}
