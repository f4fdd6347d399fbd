//! Error types for the sandbox.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Errors raised at the sandbox boundary.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Invalid project root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Path escapes the project root: {0}")]
    PathEscape(String),

    #[error("Command not allowed: {0:?}")]
    CommandRejected(String),

    #[error(
        "Command `{command}` failed ({}){}",
        exit_label(.exit_code),
        output_tail(.stdout, .stderr)
    )]
    CommandExecution {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Command `{command}` timed out after {seconds} seconds")]
    CommandTimeout { command: String, seconds: u64 },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

const TAIL_CHARS: usize = 2000;

fn output_tail(stdout: &str, stderr: &str) -> String {
    let combined = [stdout.trim_end(), stderr.trim_end()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if combined.is_empty() {
        return String::new();
    }

    let skip = combined.chars().count().saturating_sub(TAIL_CHARS);
    let tail: String = combined.chars().skip(skip).collect();
    format!(":\n{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_execution_message_includes_streams() {
        let err = SandboxError::CommandExecution {
            command: "npm run build".to_string(),
            exit_code: Some(1),
            stdout: "compiling\n".to_string(),
            stderr: "Type error: x is not defined\n".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("exit code 1"));
        assert!(message.contains("compiling"));
        assert!(message.contains("Type error"));
    }

    #[test]
    fn test_command_execution_message_without_output() {
        let err = SandboxError::CommandExecution {
            command: "npm run lint".to_string(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };

        assert_eq!(err.to_string(), "Command `npm run lint` failed (terminated by signal)");
    }
}
