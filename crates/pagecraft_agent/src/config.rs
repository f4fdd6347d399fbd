//! Agent configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult};

/// Environment variable selecting the planner endpoint.
pub const ENV_PLANNER_URL: &str = "PAGECRAFT_PLANNER_URL";
/// Environment variable selecting the project root.
pub const ENV_PROJECT_ROOT: &str = "PAGECRAFT_PROJECT_ROOT";
/// Environment variable overriding the planner timeout, in seconds.
pub const ENV_PLANNER_TIMEOUT: &str = "PAGECRAFT_PLANNER_TIMEOUT_SECS";

pub const DEFAULT_PLANNER_ENDPOINT: &str = "http://localhost:8080/invocations";
pub const DEFAULT_PROJECT_ROOT: &str = "./web";
pub const DEFAULT_PLANNER_TIMEOUT_SECS: u64 = 60;

/// Settings for one agent instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Directory all file actions are confined to
    pub project_root: PathBuf,
    /// Planner service URL
    pub planner_endpoint: String,
    /// Hard limit on the planner round trip
    pub planner_timeout_seconds: u64,
    /// Limit on each foreground command (0 = no limit)
    pub command_timeout_seconds: u64,
    /// Startup window for background commands such as the dev server
    pub dev_server_grace_ms: u64,
    /// Attach the logs of applied actions to execution errors
    pub keep_logs_on_failure: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from(DEFAULT_PROJECT_ROOT),
            planner_endpoint: DEFAULT_PLANNER_ENDPOINT.to_string(),
            planner_timeout_seconds: DEFAULT_PLANNER_TIMEOUT_SECS,
            command_timeout_seconds: 300, // 5 minutes
            dev_server_grace_ms: 3000,
            keep_logs_on_failure: false,
        }
    }
}

/// Parse a planner timeout given as whole seconds.
pub fn parse_timeout_seconds(raw: &str) -> AgentResult<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        AgentError::Config(format!(
            "{} must be a whole number of seconds, got {:?}",
            ENV_PLANNER_TIMEOUT, raw
        ))
    })
}

impl AgentConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_PLANNER_URL).filter(|v| !v.trim().is_empty()) {
            config.planner_endpoint = url.trim().to_string();
        }

        if let Some(root) = lookup(ENV_PROJECT_ROOT).filter(|v| !v.trim().is_empty()) {
            config.project_root = PathBuf::from(root);
        }

        if let Some(raw) = lookup(ENV_PLANNER_TIMEOUT) {
            config.planner_timeout_seconds = parse_timeout_seconds(&raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> AgentResult<()> {
        if self.planner_endpoint.trim().is_empty() {
            return Err(AgentError::Config("planner endpoint is empty".to_string()));
        }
        if self.planner_timeout_seconds == 0 {
            return Err(AgentError::Config(
                "planner timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn planner_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.planner_endpoint = endpoint.into();
        self
    }

    pub fn planner_timeout(mut self, seconds: u64) -> Self {
        self.planner_timeout_seconds = seconds;
        self
    }

    pub fn command_timeout(mut self, seconds: u64) -> Self {
        self.command_timeout_seconds = seconds;
        self
    }

    pub fn dev_server_grace(mut self, millis: u64) -> Self {
        self.dev_server_grace_ms = millis;
        self
    }

    pub fn keep_logs_on_failure(mut self, enabled: bool) -> Self {
        self.keep_logs_on_failure = enabled;
        self
    }
}
