//! pagecraft CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Any failure

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use pagecraft_agent::{Agent, AgentError, RunOptions};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod report;

use cli::Cli;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(ExitCodes::FAILURE);
        }
    };

    // Logs go to stderr so stdout stays scrapeable
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directives()));
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    match run(&cli).await {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            match e.downcast_ref::<AgentError>() {
                Some(agent_error) => eprint!("{}", report::render_failure(agent_error)),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::from(ExitCodes::FAILURE)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.agent_config()?;
    debug!(
        "Planner {} (timeout {}s), project root {}",
        config.planner_endpoint,
        config.planner_timeout_seconds,
        config.project_root.display()
    );

    let result = Agent::new(config)
        .run(&cli.prompt, &RunOptions::default())
        .await?;

    let output = report::render_success(&result).context("Failed to encode result")?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write result")?;

    Ok(())
}
