//! Integration tests for the sandbox boundary.
//!
//! Command execution is exercised through the mock runner so these tests do
//! not depend on a Node.js toolchain.

use std::fs;

use pagecraft_sandbox::{
    CommandGate, CommandMode, CommandRunner, MockCommandRunner, MockResponse, SandboxError,
    SandboxRoot,
};
use tempfile::TempDir;

/// Gate plus mock runner: the runner only ever sees admitted commands.
#[tokio::test]
async fn test_gate_then_run_with_mock() {
    let dir = TempDir::new().unwrap();
    let root = SandboxRoot::new(dir.path()).unwrap();
    let gate = CommandGate::default();
    let runner = MockCommandRunner::new().add_response(MockResponse::success("compiled"));

    let build = gate.check("npm run build").unwrap();
    let output = runner.run(&build, root.path()).await.unwrap();

    assert_eq!(output.transcript(), "$ npm run build\ncompiled");

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].command, "npm run build");
    assert_eq!(calls[0].mode, CommandMode::Foreground);
    assert_eq!(calls[0].workdir, root.path());
}

/// Mock failures surface as execution errors once checked.
#[tokio::test]
async fn test_mock_failure_is_execution_error() {
    let dir = TempDir::new().unwrap();
    let runner = MockCommandRunner::new().with_responses(vec![
        MockResponse::success("lint ok"),
        MockResponse::failure(1, "Failed to compile"),
    ]);
    let gate = CommandGate::default();

    let lint = gate.check("npm run lint").unwrap();
    let build = gate.check("npm run build").unwrap();

    assert!(runner.run(&lint, dir.path()).await.unwrap().ensure_success().is_ok());
    match runner.run(&build, dir.path()).await.unwrap().ensure_success() {
        Err(SandboxError::CommandExecution { command, stderr, .. }) => {
            assert_eq!(command, "npm run build");
            assert_eq!(stderr, "Failed to compile");
        }
        other => panic!("expected execution error, got {:?}", other),
    }
    assert_eq!(runner.call_count(), 2);
}

/// Resolved paths can be written and never leave the root.
#[test]
fn test_resolved_paths_stay_inside_root() {
    let dir = TempDir::new().unwrap();
    let root = SandboxRoot::new(dir.path()).unwrap();

    let target = root.resolve("app/about/page.tsx").unwrap();
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, "export default function About() {}").unwrap();

    assert!(target.starts_with(root.path()));
    assert!(matches!(root.resolve("app/../../escape.txt"), Err(SandboxError::PathEscape(_))));
}
