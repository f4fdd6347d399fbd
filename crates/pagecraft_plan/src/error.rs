//! Error types for plan handling.

use thiserror::Error;

/// Result type alias for plan operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while reading a plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The planner payload does not follow the action grammar.
    #[error("Schema error: {0}")]
    Schema(String),
}

impl PlanError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}
