//! Error types for the agent pipeline.

use std::time::Duration;

use pagecraft_plan::PlanError;
use pagecraft_sandbox::SandboxError;
use thiserror::Error;

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Every way an agent run can fail. No failure is retried or swallowed.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Planner unreachable at {endpoint}: {message}")]
    PlannerUnreachable { endpoint: String, message: String },

    #[error("Planner returned HTTP {status}: {detail}")]
    PlannerHttp { status: u16, detail: String },

    #[error("Planner did not answer within {after:?}")]
    Timeout { after: Duration },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// Execution failure carrying the logs of the actions applied before it.
    /// Only produced when partial logs are explicitly requested.
    #[error("{source}")]
    PartialExecution {
        #[source]
        source: Box<AgentError>,
        logs: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// Name of the error in the run failure taxonomy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlannerUnreachable { .. } => "PlannerUnreachableError",
            Self::PlannerHttp { .. } => "PlannerHttpError",
            Self::Timeout { .. } => "TimeoutError",
            Self::Plan(PlanError::Schema(_)) => "SchemaError",
            Self::Sandbox(err) => match err {
                SandboxError::PathEscape(_) => "PathEscapeError",
                SandboxError::CommandRejected(_) => "CommandRejectedError",
                SandboxError::CommandExecution { .. } | SandboxError::Spawn { .. } => {
                    "CommandExecutionError"
                }
                SandboxError::CommandTimeout { .. } => "TimeoutError",
                SandboxError::InvalidRoot { .. } => "ConfigError",
                SandboxError::Io(_) => "IoError",
            },
            Self::PartialExecution { source, .. } => source.kind(),
            Self::Config(_) => "ConfigError",
            Self::Io(_) => "IoError",
        }
    }

    /// Logs collected before the failure, when partial logs were requested.
    pub fn partial_logs(&self) -> Option<&[String]> {
        match self {
            Self::PartialExecution { logs, .. } => Some(logs.as_slice()),
            _ => None,
        }
    }
}
