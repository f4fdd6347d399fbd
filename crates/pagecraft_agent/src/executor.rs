//! Plan executor.
//!
//! Applies a validated plan to the sandbox strictly in order. The first failing
//! action aborts the rest of the plan. Actions already applied are not rolled
//! back.

use std::io::ErrorKind;
use std::sync::Arc;

use pagecraft_plan::{Action, Plan};
use pagecraft_sandbox::{CommandGate, CommandRunner, SandboxRoot};
use tracing::{debug, error, info};

use crate::error::{AgentError, AgentResult};

/// Applies plans to one sandbox.
pub struct ActionExecutor {
    root: SandboxRoot,
    gate: CommandGate,
    runner: Arc<dyn CommandRunner>,
    keep_logs_on_failure: bool,
}

impl ActionExecutor {
    pub fn new(root: SandboxRoot, gate: CommandGate, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root,
            gate,
            runner,
            keep_logs_on_failure: false,
        }
    }

    /// Report the logs of applied actions alongside an execution error.
    pub fn keep_logs_on_failure(mut self, enabled: bool) -> Self {
        self.keep_logs_on_failure = enabled;
        self
    }

    /// Execute a plan, returning one log entry per action.
    pub async fn execute(&self, plan: &Plan) -> AgentResult<Vec<String>> {
        self.preflight(plan)?;

        info!("Executing plan with {} action(s)", plan.len());
        let mut logs = Vec::with_capacity(plan.len());

        for (index, action) in plan.iter().enumerate() {
            debug!("Action [{}/{}]: {}", index + 1, plan.len(), action);

            match self.apply(action).await {
                Ok(entry) => logs.push(entry),
                Err(e) => {
                    error!("Action [{}/{}] failed: {}", index + 1, plan.len(), e);
                    return Err(if self.keep_logs_on_failure {
                        AgentError::PartialExecution {
                            source: Box::new(e),
                            logs,
                        }
                    } else {
                        e
                    });
                }
            }
        }

        info!("Plan executed");
        Ok(logs)
    }

    /// Check every path and command before the first side effect, so a
    /// security rejection anywhere in the plan leaves the project untouched.
    pub fn preflight(&self, plan: &Plan) -> AgentResult<()> {
        for action in plan {
            match action {
                Action::CreateFile { path, .. }
                | Action::UpdateFile { path, .. }
                | Action::DeleteFile { path } => {
                    self.root.resolve(path)?;
                }
                Action::RunCommand { command } => {
                    self.gate.check(command)?;
                }
            }
        }
        Ok(())
    }

    async fn apply(&self, action: &Action) -> AgentResult<String> {
        match action {
            Action::CreateFile { path, contents } | Action::UpdateFile { path, contents } => {
                let target = self.root.resolve(path)?;
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&target, contents).await?;
                Ok(format!("wrote {}", path))
            }
            Action::DeleteFile { path } => {
                let target = self.root.resolve(path)?;
                match tokio::fs::remove_file(&target).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        debug!("Nothing to delete at {}", path);
                    }
                    Err(e) => return Err(e.into()),
                }
                Ok(format!("deleted {}", path))
            }
            Action::RunCommand { command } => {
                let allowed = self.gate.check(command)?;
                let output = self
                    .runner
                    .run(&allowed, self.root.path())
                    .await?
                    .ensure_success()?;
                Ok(output.transcript())
            }
        }
    }
}
