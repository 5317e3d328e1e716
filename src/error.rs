use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy for the planner core.
///
/// `Validation` is surfaced to the user and aborts the operation with no
/// state mutated. `Persistence` is logged and never retried. `NotFound` only
/// arises from stale UI references (e.g. a row that a concurrent remote
/// update already removed) and callers treat it as a silent no-op.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{0}")]
    Validation(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("no task with id {0}")]
    NotFound(Uuid),
}

impl PlannerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}
