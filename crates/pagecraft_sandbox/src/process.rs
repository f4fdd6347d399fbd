//! Process-backed command runner.
//!
//! Commands are spawned directly from the allowlist entry's program and
//! arguments, never through a shell.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::allowlist::{AllowedCommand, CommandMode};
use crate::error::{SandboxError, SandboxResult};
use crate::runner::{CommandOutput, CommandRunner};

/// Directory under the project root receiving background process logs.
pub const BACKGROUND_LOG_DIR: &str = ".pagecraft/logs";

/// Process runner options.
#[derive(Debug, Clone)]
pub struct ProcessRunnerOptions {
    /// Timeout for foreground commands in seconds (0 = no timeout)
    pub timeout_seconds: u64,
    /// How long a background command must survive to count as started
    pub background_grace: Duration,
}

impl Default for ProcessRunnerOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 300, // 5 minutes
            background_grace: Duration::from_millis(3000),
        }
    }
}

impl ProcessRunnerOptions {
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn background_grace(mut self, grace: Duration) -> Self {
        self.background_grace = grace;
        self
    }
}

/// Runs allowlisted commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    options: ProcessRunnerOptions,
}

impl ProcessRunner {
    pub fn new(options: ProcessRunnerOptions) -> Self {
        Self { options }
    }

    fn base_command(command: &AllowedCommand, workdir: &Path) -> Command {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .current_dir(workdir)
            .stdin(Stdio::null());
        cmd
    }

    async fn run_foreground(
        &self,
        command: &AllowedCommand,
        workdir: &Path,
    ) -> SandboxResult<CommandOutput> {
        let mut cmd = Self::base_command(command, workdir);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started_at = Utc::now();
        let start = Instant::now();

        let child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            command: command.command.to_string(),
            source,
        })?;

        let output = if self.options.timeout_seconds == 0 {
            child.wait_with_output().await?
        } else {
            let limit = Duration::from_secs(self.options.timeout_seconds);
            // Dropping the future drops the child, which kills it.
            match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        "Command `{}` exceeded {}s, killed",
                        command.command, self.options.timeout_seconds
                    );
                    return Err(SandboxError::CommandTimeout {
                        command: command.command.to_string(),
                        seconds: self.options.timeout_seconds,
                    });
                }
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Command `{}` exited with {:?} after {}ms",
            command.command,
            output.status.code(),
            duration_ms
        );

        Ok(CommandOutput {
            command: command.command.to_string(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            background_pid: None,
            started_at,
            finished_at: Utc::now(),
            duration_ms,
        })
    }

    /// Start a long-running command with output going to a log file, then
    /// watch it for the startup window.
    async fn run_background(
        &self,
        command: &AllowedCommand,
        workdir: &Path,
    ) -> SandboxResult<CommandOutput> {
        let log_path = background_log_path(workdir, command);
        if let Some(parent) = log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let log_file = tokio::fs::File::create(&log_path).await?.into_std().await;

        let mut cmd = Self::base_command(command, workdir);
        cmd.stdout(Stdio::from(log_file.try_clone()?))
            .stderr(Stdio::from(log_file));

        let started_at = Utc::now();
        let start = Instant::now();

        let mut child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            command: command.command.to_string(),
            source,
        })?;

        let waited = tokio::time::timeout(self.options.background_grace, child.wait()).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let log = match tokio::fs::read_to_string(&log_path).await {
            Ok(log) => log,
            Err(e) => {
                warn!("Could not read startup log {}: {}", log_path.display(), e);
                String::new()
            }
        };

        let (exit_code, background_pid) = match waited {
            Ok(status) => {
                let status = status?;
                warn!(
                    "Background command `{}` exited during startup with {:?}",
                    command.command,
                    status.code()
                );
                (status.code(), None)
            }
            Err(_) => {
                let pid = child.id();
                info!(
                    "Background command `{}` running (pid {:?}), log at {}",
                    command.command,
                    pid,
                    log_path.display()
                );
                (None, pid)
            }
        };

        Ok(CommandOutput {
            command: command.command.to_string(),
            exit_code,
            stdout: log,
            stderr: String::new(),
            background_pid,
            started_at,
            finished_at: Utc::now(),
            duration_ms,
        })
    }
}

fn background_log_path(workdir: &Path, command: &AllowedCommand) -> PathBuf {
    let slug: String = command
        .command
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    workdir.join(BACKGROUND_LOG_DIR).join(format!("{}.log", slug))
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &AllowedCommand, workdir: &Path) -> SandboxResult<CommandOutput> {
        info!("Running `{}` in {}", command.command, workdir.display());
        match command.mode {
            CommandMode::Foreground => self.run_foreground(command, workdir).await,
            CommandMode::Background => self.run_background(command, workdir).await,
        }
    }
}
