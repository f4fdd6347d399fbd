//! Command runner trait and types.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allowlist::AllowedCommand;
use crate::error::{SandboxError, SandboxResult};

/// Captured result of running an allowlisted command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput {
    /// The command as invoked
    pub command: String,
    /// Exit code, `None` while a background process is still running
    pub exit_code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Process id of a background process left running
    pub background_pid: Option<u32>,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time (or end of the startup window)
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl CommandOutput {
    /// Check if the command succeeded or is still running in the background.
    pub fn success(&self) -> bool {
        self.background_pid.is_some() || self.exit_code == Some(0)
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout.trim_end(), self.stderr)
        }
    }

    /// Log transcript: the invoked command followed by its output.
    pub fn transcript(&self) -> String {
        let mut transcript = format!("$ {}", self.command);
        let output = self.combined_output();
        let output = output.trim_end();
        if !output.is_empty() {
            transcript.push('\n');
            transcript.push_str(output);
        }
        if let Some(pid) = self.background_pid {
            transcript.push_str(&format!("\n[running in background, pid {}]", pid));
        }
        transcript
    }

    /// Turn an unsuccessful exit into a [`SandboxError::CommandExecution`].
    pub fn ensure_success(self) -> SandboxResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(SandboxError::CommandExecution {
                command: self.command,
                exit_code: self.exit_code,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Executes allowlisted commands inside a project directory.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command with `workdir` as its working directory.
    ///
    /// A nonzero exit is reported in the output, not as an error; callers
    /// decide via [`CommandOutput::ensure_success`].
    async fn run(&self, command: &AllowedCommand, workdir: &Path) -> SandboxResult<CommandOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: Option<i32>, stdout: &str, stderr: &str) -> CommandOutput {
        let now = Utc::now();
        CommandOutput {
            command: "npm run build".to_string(),
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            background_pid: None,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_transcript_prefixes_command() {
        let out = output(Some(0), "built\n", "warn: slow\n");
        assert_eq!(out.transcript(), "$ npm run build\nbuilt\nwarn: slow");
    }

    #[test]
    fn test_transcript_without_output() {
        assert_eq!(output(Some(0), "", "").transcript(), "$ npm run build");
    }

    #[test]
    fn test_ensure_success() {
        assert!(output(Some(0), "", "").ensure_success().is_ok());

        match output(Some(2), "partial", "boom").ensure_success() {
            Err(SandboxError::CommandExecution { exit_code, stderr, .. }) => {
                assert_eq!(exit_code, Some(2));
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected execution error, got {:?}", other),
        }
    }

    #[test]
    fn test_background_process_counts_as_success() {
        let mut out = output(None, "ready on :3000", "");
        out.background_pid = Some(4242);

        assert!(out.success());
        assert!(out.transcript().ends_with("[running in background, pid 4242]"));
    }
}
