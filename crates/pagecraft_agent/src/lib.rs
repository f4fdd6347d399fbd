//! # pagecraft_agent
//!
//! Turns a natural-language prompt into changes to a Next.js project.
//!
//! A run snapshots the project, asks a remote planner for an ordered list of
//! file and command actions, validates that list, applies it inside the
//! project sandbox and reports the page worth previewing.
//!
//! # Example
//!
//! ```rust,no_run
//! use pagecraft_agent::{Agent, AgentConfig, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::new("./web").planner_timeout(30);
//!     let result = Agent::new(config)
//!         .run("Add a pricing page with three tiers", &RunOptions::default())
//!         .await?;
//!
//!     println!("{}", result.assistant_message);
//!     println!("Preview: {}", result.preview_path);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod planner;

pub use agent::{run_agent, Agent, ExecutionResult, RunOptions};
pub use config::AgentConfig;
pub use context::{ContextSnapshotter, ProjectContext, ProjectManifest, RouterStyle};
pub use error::{AgentError, AgentResult};
pub use executor::ActionExecutor;
pub use planner::{HttpPlanner, PlanRequest, PlanSource, PlannerReply};
