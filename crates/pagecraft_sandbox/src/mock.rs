//! Mock command runner for testing.
//!
//! Captures every call and replays predefined responses, so executor tests
//! can check command handling without spawning processes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::allowlist::{AllowedCommand, CommandMode};
use crate::error::SandboxResult;
use crate::runner::{CommandOutput, CommandRunner};

/// Predefined response for a command run.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// A captured call for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub command: String,
    pub mode: CommandMode,
    pub workdir: PathBuf,
}

/// Mock runner. Clones share state, so a test can keep a handle for assertions.
#[derive(Clone, Default)]
pub struct MockCommandRunner {
    responses: Arc<RwLock<Vec<MockResponse>>>,
    response_index: Arc<AtomicUsize>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for the next call. Calls beyond the queue succeed silently.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        self.responses.write().extend(responses);
        self
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    fn next_response(&self) -> MockResponse {
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        self.responses
            .read()
            .get(index)
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, command: &AllowedCommand, workdir: &Path) -> SandboxResult<CommandOutput> {
        self.captured_calls.write().push(CapturedCall {
            command: command.command.to_string(),
            mode: command.mode,
            workdir: workdir.to_path_buf(),
        });

        let response = self.next_response();
        let now = Utc::now();
        Ok(CommandOutput {
            command: command.command.to_string(),
            exit_code: Some(response.exit_code),
            stdout: response.stdout,
            stderr: response.stderr,
            background_pid: None,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        })
    }
}
