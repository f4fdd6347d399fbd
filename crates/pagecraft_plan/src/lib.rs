//! # pagecraft_plan
//!
//! Action plan model for pagecraft.
//!
//! This crate provides the pure, I/O-free half of plan handling:
//! - **Actions**: the closed set of file and command actions a planner may emit
//! - **Plan Validation**: strict checking of an untrusted planner payload
//! - **Preview Inference**: deriving the most relevant route to preview
//!
//! ## Example
//!
//! ```rust
//! use pagecraft_plan::{infer_preview_path, PlanValidator};
//! use serde_json::json;
//!
//! let raw = json!([
//!     { "type": "create_file", "path": "app/(marketing)/about/page.tsx", "contents": "export default function About() { return null }" },
//!     { "type": "run_command", "command": "npm run build" }
//! ]);
//!
//! let plan = PlanValidator::validate(&raw).unwrap();
//! assert_eq!(infer_preview_path(plan.actions()), Some("/about".to_string()));
//! ```

pub mod action;
pub mod error;
pub mod preview;
pub mod validator;

pub use action::{Action, ActionKind, Plan};
pub use error::{PlanError, PlanResult};
pub use preview::{
    default_rules, infer_preview_path, infer_with_rules, preview_path_or_root, RouteExtractor, RouteRule,
    HOME_PAGE_FILES, PREVIEW_FALLBACK,
};
pub use validator::{PlanValidator, ValidationReport};
