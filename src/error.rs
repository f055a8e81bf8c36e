//! Error type shared by every engine command and query.

use thiserror::Error;

use crate::project::TransitionError;

/// Errors raised by the engine.
///
/// Every variant is recoverable: a command that fails leaves the persisted
/// project exactly as it was before the command ran.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input: negative budget, non-positive duration, date out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// A transition was attempted before its gating condition holds.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(String),

    /// Reference to a nonexistent project, item or approval request.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent mutation invalidated the optimistic version check.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// Reading or writing persisted state failed.
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    /// Stable snake_case code used in JSON envelopes and RPC errors.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation_error",
            EngineError::PreconditionNotMet(_) => "precondition_not_met",
            EngineError::NotFound(_) => "not_found",
            EngineError::StateConflict(_) => "state_conflict",
            EngineError::Storage(_) => "storage_error",
        }
    }

    /// The detail message without the kind prefix.
    pub fn detail(&self) -> String {
        match self {
            EngineError::Validation(msg)
            | EngineError::PreconditionNotMet(msg)
            | EngineError::NotFound(msg)
            | EngineError::StateConflict(msg) => msg.clone(),
            EngineError::Storage(err) => format!("{:#}", err),
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        EngineError::PreconditionNotMet(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        EngineError::NotFound(msg.into())
    }
}

impl From<TransitionError> for EngineError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::IncompleteItems { .. }
            | TransitionError::NoItems
            | TransitionError::ApprovalPending(_)
            | TransitionError::InvalidTransition { .. } => {
                EngineError::PreconditionNotMet(err.to_string())
            }
            TransitionError::ClosureDateAlreadySet(_) => EngineError::StateConflict(err.to_string()),
        }
    }
}
