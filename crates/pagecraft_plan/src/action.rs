//! Plan actions.
//!
//! A plan is an ordered list of actions. Execution order is plan order, so a
//! later write to the same path wins.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of action a planner may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateFile,
    UpdateFile,
    DeleteFile,
    RunCommand,
}

impl ActionKind {
    /// Every recognized kind.
    pub const ALL: [ActionKind; 4] = [
        Self::CreateFile,
        Self::UpdateFile,
        Self::DeleteFile,
        Self::RunCommand,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateFile => "create_file",
            Self::UpdateFile => "update_file",
            Self::DeleteFile => "delete_file",
            Self::RunCommand => "run_command",
        }
    }

    /// Look up a kind by its wire name. Unknown names are never guessed.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file mutation or command request.
///
/// File paths are project-relative. `contents` is always the complete file,
/// never a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    CreateFile { path: String, contents: String },
    UpdateFile { path: String, contents: String },
    DeleteFile { path: String },
    RunCommand { command: String },
}

impl Action {
    pub fn create(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self::CreateFile {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn update(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self::UpdateFile {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::DeleteFile { path: path.into() }
    }

    pub fn run(command: impl Into<String>) -> Self {
        Self::RunCommand {
            command: command.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::CreateFile { .. } => ActionKind::CreateFile,
            Self::UpdateFile { .. } => ActionKind::UpdateFile,
            Self::DeleteFile { .. } => ActionKind::DeleteFile,
            Self::RunCommand { .. } => ActionKind::RunCommand,
        }
    }

    /// The project-relative path this action touches, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::CreateFile { path, .. }
            | Self::UpdateFile { path, .. }
            | Self::DeleteFile { path } => Some(path),
            Self::RunCommand { .. } => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFile { path, .. }
            | Self::UpdateFile { path, .. }
            | Self::DeleteFile { path } => write!(f, "{} {}", self.kind(), path),
            Self::RunCommand { command } => write!(f, "{} {}", self.kind(), command),
        }
    }
}

/// An ordered sequence of actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    actions: Vec<Action>,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }
}

impl From<Vec<Action>> for Plan {
    fn from(actions: Vec<Action>) -> Self {
        Self::new(actions)
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
