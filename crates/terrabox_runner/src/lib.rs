//! # terrabox_runner
//!
//! Container invocation plumbing for terrabox.
//!
//! This crate builds `docker run` / `podman run` command lines and runs them
//! as subprocesses, streaming stdout while the process is alive.
//!
//! # Features
//!
//! - **Structured command lines**: tokens stay discrete until rendered
//! - **Runtime Detection**: Auto-detect Docker vs Podman
//! - **Streaming executor**: stdout forwarded line by line to a callback
//! - **Secret forwarding**: `-e NAME` on the command line, values via env
//! - **Mock Executor**: For testing without a shell or containers
//!
//! # Example
//!
//! ```rust,no_run
//! use terrabox_runner::{
//!     discard_progress, Arg, CommandExecutor, ContainerConfig, ContainerRuntime, DockerCommand,
//!     ExecRequest, ShellExecutor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = ContainerRuntime::detect(None)?;
//!     let config = ContainerConfig::new("hashicorp/terraform:latest")
//!         .command(vec![Arg::literal("version")]);
//!     let line = DockerCommand::new(runtime).build(&config)?;
//!
//!     let output = ShellExecutor::new()
//!         .execute(ExecRequest::new(line.render()), discard_progress())
//!         .await;
//!     println!("{}", output.stdout);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod docker;
pub mod error;
pub mod kv;
pub mod mock;
pub mod runner;
pub mod shell;
pub mod user;

pub use config::{Arg, ContainerConfig, MountConfig, DEFAULT_TERRAFORM_IMAGE};
pub use docker::{CommandLine, ContainerRuntime, DockerCommand};
pub use error::{RunnerError, RunnerResult};
pub use kv::parse_key_value_pairs;
pub use mock::{CapturedCall, MockExecutor, MockResponse};
pub use runner::{discard_progress, CommandExecutor, ExecOutput, ExecRequest, ProgressHandler};
pub use shell::ShellExecutor;
pub use user::current_user_id;
