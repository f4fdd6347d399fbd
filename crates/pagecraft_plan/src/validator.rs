//! Plan validation.
//!
//! The planner is an untrusted source. Its action list is checked in full
//! before anything touches disk, so a single bad action rejects the plan.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::action::{Action, ActionKind, Plan};
use crate::error::{PlanError, PlanResult};

/// Accumulated validation issues.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert the report into a schema error, if it holds any issue.
    pub fn into_result(self) -> PlanResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(PlanError::Schema(self.errors.join("; ")))
        }
    }
}

/// Validator for planner action lists.
pub struct PlanValidator;

impl PlanValidator {
    /// Validate a decoded action list and build a typed plan from it.
    ///
    /// Every element is checked before the plan is returned.
    pub fn validate(raw: &Value) -> PlanResult<Plan> {
        let items = raw.as_array().ok_or_else(|| {
            PlanError::schema(format!(
                "plan must be a list of actions, got {}",
                type_name(raw)
            ))
        })?;

        let mut report = ValidationReport::new();
        let mut actions = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            match Self::validate_action(index, item) {
                Ok(action) => actions.push(action),
                Err(message) => report.add_error(message),
            }
        }

        if !report.is_valid() {
            warn!("Rejected plan with {} invalid action(s)", report.errors.len());
        }
        report.into_result()?;

        debug!("Validated plan with {} action(s)", actions.len());
        Ok(Plan::new(actions))
    }

    /// Validate a single action, returning a description of the first problem.
    fn validate_action(index: usize, item: &Value) -> Result<Action, String> {
        let fields = item
            .as_object()
            .ok_or_else(|| format!("action #{} must be an object, got {}", index, type_name(item)))?;

        let kind_name = match fields.get("type") {
            Some(Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(format!(
                    "action #{} has a non-string `type` ({})",
                    index,
                    type_name(other)
                ))
            }
            None => return Err(format!("action #{} is missing `type`", index)),
        };

        let kind = ActionKind::from_wire(kind_name)
            .ok_or_else(|| format!("action #{} has unrecognized kind `{}`", index, kind_name))?;

        match kind {
            ActionKind::CreateFile => Ok(Action::CreateFile {
                path: required_path(index, kind, fields)?,
                contents: required_text(index, kind, fields, "contents")?,
            }),
            ActionKind::UpdateFile => {
                let path = required_path(index, kind, fields)?;
                let contents = required_text(index, kind, fields, "contents")?;
                if contents.is_empty() {
                    return Err(format!(
                        "action #{} ({}) has empty `contents`; updates replace the whole file",
                        index, kind
                    ));
                }
                Ok(Action::UpdateFile { path, contents })
            }
            ActionKind::DeleteFile => Ok(Action::DeleteFile {
                path: required_path(index, kind, fields)?,
            }),
            ActionKind::RunCommand => {
                // Older planners send the command under `script`.
                let field = if fields.contains_key("command") {
                    "command"
                } else if fields.contains_key("script") {
                    "script"
                } else {
                    return Err(format!("action #{} ({}) is missing `command`", index, kind));
                };
                let command = required_text(index, kind, fields, field)?;
                if command.trim().is_empty() {
                    return Err(format!("action #{} ({}) has an empty command", index, kind));
                }
                Ok(Action::RunCommand { command })
            }
        }
    }
}

fn required_path(index: usize, kind: ActionKind, fields: &Map<String, Value>) -> Result<String, String> {
    let path = required_text(index, kind, fields, "path")?;
    if path.trim().is_empty() {
        return Err(format!("action #{} ({}) has an empty `path`", index, kind));
    }
    Ok(path)
}

fn required_text(
    index: usize,
    kind: ActionKind,
    fields: &Map<String, Value>,
    field: &str,
) -> Result<String, String> {
    match fields.get(field) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(format!(
            "action #{} ({}) field `{}` must be text, got {}",
            index,
            kind,
            field,
            type_name(other)
        )),
        None => Err(format!("action #{} ({}) is missing `{}`", index, kind, field)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
