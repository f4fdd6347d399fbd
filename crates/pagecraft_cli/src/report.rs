//! Human and machine output for a finished run.

use pagecraft_agent::{AgentError, ExecutionResult};
use pagecraft_plan::Action;

/// Prefix of the final stdout line carrying the JSON result.
pub const AGENT_JSON_SENTINEL: &str = "AGENT_JSON:";

/// Stdout text for a successful run. The sentinel line is always last.
pub fn render_success(result: &ExecutionResult) -> serde_json::Result<String> {
    let mut out = String::new();

    out.push_str(&result.assistant_message);
    out.push_str("\n\nPlan:\n");
    if result.plan.is_empty() {
        out.push_str("  (no actions)\n");
    }
    for (index, action) in result.plan.iter().enumerate() {
        out.push_str(&format!("{}. {} {}\n", index + 1, action.kind(), action_target(action)));
    }

    if !result.logs.is_empty() {
        out.push_str("\nLogs:\n");
        for entry in &result.logs {
            out.push_str(entry);
            out.push('\n');
        }
    }

    out.push_str(&format!("\nPreview: {}\n", result.preview_path));
    out.push_str(AGENT_JSON_SENTINEL);
    out.push_str(&serde_json::to_string(result)?);
    out.push('\n');

    Ok(out)
}

/// Stderr text for a failed run.
pub fn render_failure(error: &AgentError) -> String {
    let mut out = format!("error[{}]: {}\n", error.kind(), error);

    if let Some(logs) = error.partial_logs() {
        out.push_str("\nApplied before the failure:\n");
        for entry in logs {
            out.push_str(entry);
            out.push('\n');
        }
    }

    out
}

fn action_target(action: &Action) -> &str {
    match action {
        Action::RunCommand { command } => command,
        other => other.path().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_plan::{Plan, PlanError};
    use serde_json::Value;

    fn result() -> ExecutionResult {
        ExecutionResult {
            assistant_message: "Added a pricing page.".to_string(),
            plan: Plan::new(vec![
                Action::create("app/pricing/page.tsx", "export default function Pricing() {}"),
                Action::run("npm run build"),
            ]),
            logs: vec![
                "wrote app/pricing/page.tsx".to_string(),
                "$ npm run build\nCompiled successfully".to_string(),
            ],
            preview_path: "/pricing".to_string(),
        }
    }

    #[test]
    fn test_success_layout() {
        let out = render_success(&result()).unwrap();

        assert!(out.starts_with("Added a pricing page.\n"));
        assert!(out.contains("1. create_file app/pricing/page.tsx\n"));
        assert!(out.contains("2. run_command npm run build\n"));
        assert!(out.contains("Compiled successfully\n"));
        assert!(out.contains("\nPreview: /pricing\n"));
    }

    #[test]
    fn test_sentinel_line_is_last_and_parses() {
        let out = render_success(&result()).unwrap();
        let last = out.lines().last().unwrap();

        let json: Value = serde_json::from_str(last.strip_prefix(AGENT_JSON_SENTINEL).unwrap()).unwrap();

        assert_eq!(json["previewPath"], "/pricing");
        assert_eq!(json["assistantMessage"], "Added a pricing page.");
        assert_eq!(json["plan"][1]["command"], "npm run build");
        assert_eq!(json["logs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_sentinel_line_is_single_line_with_multiline_contents() {
        let mut result = result();
        result.plan = Plan::new(vec![Action::create("app/page.tsx", "line one\nline two\n")]);

        let out = render_success(&result).unwrap();

        assert_eq!(out.lines().filter(|l| l.starts_with(AGENT_JSON_SENTINEL)).count(), 1);
    }

    #[test]
    fn test_empty_plan() {
        let mut result = result();
        result.plan = Plan::default();
        result.logs.clear();
        result.preview_path = "/".to_string();

        let out = render_success(&result).unwrap();

        assert!(out.contains("(no actions)"));
        assert!(!out.contains("Logs:"));
        assert!(out.contains("Preview: /\n"));
    }

    #[test]
    fn test_failure_line() {
        let error = AgentError::from(PlanError::schema("action #0 has unrecognized kind `rename_file`"));

        assert_eq!(
            render_failure(&error),
            "error[SchemaError]: Schema error: action #0 has unrecognized kind `rename_file`\n"
        );
    }

    #[test]
    fn test_failure_with_partial_logs() {
        let error = AgentError::PartialExecution {
            source: Box::new(AgentError::Config("boom".to_string())),
            logs: vec!["wrote app/page.tsx".to_string()],
        };

        let out = render_failure(&error);

        assert!(out.starts_with("error[ConfigError]: Configuration error: boom\n"));
        assert!(out.ends_with("Applied before the failure:\nwrote app/page.tsx\n"));
    }
}
