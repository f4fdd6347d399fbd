//! The prompt-to-preview pipeline.
//!
//! One run takes a context snapshot, asks the planner for a plan, validates
//! it, applies it to the sandbox and infers which page to preview. Stages run
//! strictly in that order and the first failure ends the run.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use pagecraft_plan::{preview_path_or_root, Plan, PlanValidator};
use pagecraft_sandbox::{CommandGate, CommandRunner, ProcessRunner, ProcessRunnerOptions, SandboxRoot};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::context::ContextSnapshotter;
use crate::error::{AgentError, AgentResult};
use crate::executor::ActionExecutor;
use crate::planner::{HttpPlanner, PlanRequest, PlanSource};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub assistant_message: String,
    pub plan: Plan,
    /// One entry per applied action, in plan order
    pub logs: Vec<String>,
    pub preview_path: String,
}

/// Per-run overrides.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Planner endpoint for this run only
    pub planner_endpoint: Option<String>,
}

impl RunOptions {
    pub fn planner_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.planner_endpoint = Some(endpoint.into());
        self
    }
}

/// Runs prompts against one project.
pub struct Agent {
    config: AgentConfig,
    planner: Arc<dyn PlanSource>,
    runner: Arc<dyn CommandRunner>,
    gate: CommandGate,
}

impl Agent {
    /// Agent talking to the configured HTTP planner and spawning real processes.
    pub fn new(config: AgentConfig) -> Self {
        let planner = HttpPlanner::new(Duration::from_secs(config.planner_timeout_seconds));
        let runner = ProcessRunner::new(
            ProcessRunnerOptions::default()
                .timeout(config.command_timeout_seconds)
                .background_grace(Duration::from_millis(config.dev_server_grace_ms)),
        );
        Self::with_components(config, Arc::new(planner), Arc::new(runner))
    }

    /// Agent with explicit planner and runner implementations.
    pub fn with_components(
        config: AgentConfig,
        planner: Arc<dyn PlanSource>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            planner,
            runner,
            gate: CommandGate::default(),
        }
    }

    /// Run one prompt end to end.
    pub async fn run(&self, prompt: &str, options: &RunOptions) -> AgentResult<ExecutionResult> {
        let run_id = Uuid::new_v4();
        self.run_stages(prompt, options)
            .instrument(info_span!("run_agent", %run_id))
            .await
    }

    async fn run_stages(&self, prompt: &str, options: &RunOptions) -> AgentResult<ExecutionResult> {
        let root = SandboxRoot::new(&self.config.project_root)?;
        info!("Project root: {}", root.path().display());

        // The snapshot walks the project tree with blocking I/O.
        let snapshot_root = root.clone();
        let context =
            tokio::task::spawn_blocking(move || ContextSnapshotter::new(&snapshot_root).snapshot())
                .await
                .map_err(|e| {
                    AgentError::Io(io::Error::new(
                        io::ErrorKind::Other,
                        format!("context snapshot task failed: {}", e),
                    ))
                })?;

        let endpoint = options
            .planner_endpoint
            .as_deref()
            .unwrap_or(&self.config.planner_endpoint);
        let request = PlanRequest {
            prompt,
            context: &context,
        };
        let reply = self.planner.fetch_plan(endpoint, &request).await?;

        let plan = PlanValidator::validate(&reply.actions)?;
        info!("Plan accepted with {} action(s)", plan.len());

        let executor = ActionExecutor::new(root, self.gate.clone(), Arc::clone(&self.runner))
            .keep_logs_on_failure(self.config.keep_logs_on_failure);
        let logs = executor.execute(&plan).await?;

        let preview_path = preview_path_or_root(plan.actions());
        info!("Preview path: {}", preview_path);

        let assistant_message = reply
            .assistant_message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("Planned {} action(s).", plan.len()));

        Ok(ExecutionResult {
            assistant_message,
            plan,
            logs,
            preview_path,
        })
    }
}

/// Run one prompt with configuration taken from the environment.
pub async fn run_agent(prompt: &str, options: RunOptions) -> AgentResult<ExecutionResult> {
    let config = AgentConfig::from_env()?;
    Agent::new(config).run(prompt, &options).await
}
