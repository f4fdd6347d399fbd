//! # pagecraft_sandbox
//!
//! The security boundary between an untrusted plan and the host.
//!
//! # Features
//!
//! - **Path Containment**: every project-relative path is resolved against an
//!   explicit [`SandboxRoot`] and rejected if it would leave it
//! - **Command Allowlist**: only exact, literal command strings may run
//! - **Process Runner**: allowlisted commands run without a shell, in the
//!   project root, with captured output and a timeout
//! - **Mock Runner**: for testing without spawning processes
//!
//! # Example
//!
//! ```rust,no_run
//! use pagecraft_sandbox::{CommandGate, CommandRunner, ProcessRunner, SandboxRoot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = SandboxRoot::new("./web")?;
//!     let page = root.resolve("app/page.tsx")?;
//!     println!("writing {}", page.display());
//!
//!     let gate = CommandGate::default();
//!     let build = gate.check("npm run build")?;
//!     let output = ProcessRunner::default().run(&build, root.path()).await?;
//!     println!("{}", output.transcript());
//!
//!     Ok(())
//! }
//! ```

pub mod allowlist;
pub mod error;
pub mod mock;
pub mod path;
pub mod process;
pub mod runner;

pub use allowlist::{AllowedCommand, CommandGate, CommandMode, DEFAULT_ALLOWLIST};
pub use error::{SandboxError, SandboxResult};
pub use mock::{CapturedCall, MockCommandRunner, MockResponse};
pub use path::SandboxRoot;
pub use process::{ProcessRunner, ProcessRunnerOptions};
pub use runner::{CommandOutput, CommandRunner};
