//! Integration tests for plan validation and preview inference.

use pagecraft_plan::{
    infer_preview_path, preview_path_or_root, Action, ActionKind, PlanError, PlanValidator,
};
use serde_json::json;

/// A typical planner answer for a new landing page.
#[test]
fn test_planner_style_plan_end_to_end() {
    let raw = json!([
        { "type": "create_file", "path": "app/layout.tsx", "contents": "export default function RootLayout() {}" },
        { "type": "create_file", "path": "app/(site)/pricing/page.tsx", "contents": "export default function Pricing() {}" },
        { "type": "update_file", "path": "app/globals.css", "contents": "@tailwind base;" },
        { "type": "run_command", "script": "npm run build" }
    ]);

    let plan = PlanValidator::validate(&raw).unwrap();

    let kinds: Vec<ActionKind> = plan.iter().map(Action::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::CreateFile,
            ActionKind::CreateFile,
            ActionKind::UpdateFile,
            ActionKind::RunCommand
        ]
    );
    assert_eq!(infer_preview_path(plan.actions()), Some("/pricing".to_string()));
}

/// A plan with only non-page edits falls back to the root route.
#[test]
fn test_non_page_plan_uses_fallback() {
    let raw = json!([
        { "type": "update_file", "path": "tailwind.config.ts", "contents": "export default {}" },
        { "type": "run_command", "command": "npm run lint" }
    ]);

    let plan = PlanValidator::validate(&raw).unwrap();

    assert_eq!(infer_preview_path(plan.actions()), None);
    assert_eq!(preview_path_or_root(plan.actions()), "/");
}

/// Validated plans survive a serialization round trip through the result payload.
#[test]
fn test_validated_plan_reserializes_in_wire_format() {
    let raw = json!([
        { "type": "delete_file", "path": "pages/old.tsx" },
        { "type": "run_command", "script": "npm run dev" }
    ]);

    let plan = PlanValidator::validate(&raw).unwrap();
    let encoded = serde_json::to_value(&plan).unwrap();

    assert_eq!(
        encoded,
        json!([
            { "type": "delete_file", "path": "pages/old.tsx" },
            { "type": "run_command", "command": "npm run dev" }
        ])
    );
}

/// A rejected plan names the offending kind.
#[test]
fn test_unknown_kind_is_a_schema_error() {
    let raw = json!([{ "type": "patch_file", "path": "a.ts", "diff": "@@" }]);

    match PlanValidator::validate(&raw) {
        Err(PlanError::Schema(message)) => assert!(message.contains("patch_file")),
        other => panic!("expected schema error, got {:?}", other),
    }
}
