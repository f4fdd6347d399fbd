//! Command allowlist gate.
//!
//! A requested command runs only if it is byte-identical to an allowlist
//! entry. There is no pattern matching and no argument parsing of the request.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SandboxError, SandboxResult};

/// How an allowed command is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMode {
    /// Runs to completion; nonzero exit fails the plan.
    Foreground,
    /// Long-running server, left running once it survives its startup window.
    Background,
}

/// A literal command the sandbox may execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedCommand {
    pub command: &'static str,
    pub mode: CommandMode,
}

impl AllowedCommand {
    pub const fn foreground(command: &'static str) -> Self {
        Self {
            command,
            mode: CommandMode::Foreground,
        }
    }

    pub const fn background(command: &'static str) -> Self {
        Self {
            command,
            mode: CommandMode::Background,
        }
    }

    /// Executable name. Entries are literals, so splitting on whitespace is exact.
    pub fn program(&self) -> &'static str {
        self.command.split_whitespace().next().unwrap_or_default()
    }

    pub fn args(&self) -> Vec<&'static str> {
        self.command.split_whitespace().skip(1).collect()
    }
}

/// Build, lint and dev invocations for the scaffolded Next.js project.
pub const DEFAULT_ALLOWLIST: &[AllowedCommand] = &[
    AllowedCommand::foreground("npm install"),
    AllowedCommand::foreground("npm run build"),
    AllowedCommand::foreground("npm run lint"),
    AllowedCommand::foreground("npm run typecheck"),
    AllowedCommand::foreground("npx tsc --noEmit"),
    AllowedCommand::background("npm run dev"),
    AllowedCommand::background("npm run start"),
];

/// Gate that admits only allowlisted commands.
#[derive(Debug, Clone)]
pub struct CommandGate {
    entries: Vec<AllowedCommand>,
}

impl Default for CommandGate {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWLIST.to_vec())
    }
}

impl CommandGate {
    pub fn new(entries: Vec<AllowedCommand>) -> Self {
        Self { entries }
    }

    /// Admit a command by exact string equality.
    pub fn check(&self, command: &str) -> SandboxResult<AllowedCommand> {
        match self.entries.iter().find(|entry| entry.command == command) {
            Some(entry) => Ok(*entry),
            None => {
                warn!("Rejected command not on the allowlist: {:?}", command);
                Err(SandboxError::CommandRejected(command.to_string()))
            }
        }
    }
}
