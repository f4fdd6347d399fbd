//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use pagecraft_agent::config::{
    parse_timeout_seconds, DEFAULT_PLANNER_ENDPOINT, DEFAULT_PLANNER_TIMEOUT_SECS,
    DEFAULT_PROJECT_ROOT, ENV_PLANNER_TIMEOUT, ENV_PLANNER_URL, ENV_PROJECT_ROOT,
};
use pagecraft_agent::{AgentConfig, AgentResult};

/// pagecraft - turn a prompt into changes to a Next.js project
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(version, about = "pagecraft - turn a prompt into changes to a Next.js project")]
#[command(long_about = r#"
pagecraft sends a prompt and a snapshot of the project to a planner service,
applies the returned plan inside the project root and prints the page to
preview.

The last line on stdout is always `AGENT_JSON:` followed by the full result
as JSON, for parent processes to scrape.

EXIT CODES:
  0 - Success
  1 - Any failure (validation, planner, execution)
"#)]
pub struct Cli {
    /// The full prompt text
    pub prompt: String,

    /// Project directory all actions are confined to
    #[arg(long, env = ENV_PROJECT_ROOT, default_value = DEFAULT_PROJECT_ROOT)]
    pub project_root: PathBuf,

    /// Planner service URL
    #[arg(long, env = ENV_PLANNER_URL, default_value = DEFAULT_PLANNER_ENDPOINT)]
    pub planner_url: String,

    /// Planner timeout in seconds
    // Parsed in `agent_config` so a malformed value is a configuration error
    #[arg(long, env = ENV_PLANNER_TIMEOUT, default_value_t = DEFAULT_PLANNER_TIMEOUT_SECS.to_string())]
    pub timeout: String,

    /// Print the logs of actions applied before a failure
    #[arg(long)]
    pub keep_logs_on_failure: bool,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Agent settings from flags, which already fall back to the environment.
    pub fn agent_config(&self) -> AgentResult<AgentConfig> {
        let config = AgentConfig::new(&self.project_root)
            .planner_endpoint(self.planner_url.trim())
            .planner_timeout(parse_timeout_seconds(&self.timeout)?)
            .keep_logs_on_failure(self.keep_logs_on_failure);
        config.validate()?;
        Ok(config)
    }

    /// Default tracing directives for the chosen verbosity.
    pub fn log_directives(&self) -> &'static str {
        if self.verbose {
            "pagecraft=debug,warn"
        } else if self.quiet {
            "error"
        } else {
            "pagecraft=info,warn"
        }
    }
}
