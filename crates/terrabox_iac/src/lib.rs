//! # terrabox_iac
//!
//! Runs Terraform commands inside a container and normalizes the result.
//!
//! ## Features
//!
//! - Working-directory and variable-file bind mounts via environment placeholders
//! - Variable files written owner-only and shredded after every run
//! - `-json` added only for subcommands that support it
//! - Single-document and newline-delimited JSON output parsing
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use terrabox_iac::{ExecutionParameters, TerraformRunner};
//! use terrabox_runner::{discard_progress, ContainerRuntime, ShellExecutor};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = TerraformRunner::new(Arc::new(ShellExecutor::new()), ContainerRuntime::Docker);
//! let params = ExecutionParameters::new("terraform plan")
//!     .working_directory("./infrastructure")
//!     .variables(json!({"region": "eu-west-1"}));
//!
//! let output = runner.execute(&params, discard_progress()).await?;
//! println!("{}", serde_json::to_string_pretty(&output)?);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod env;
pub mod error;
pub mod output;
pub mod params;
pub mod paths;
pub mod terraform;

pub use command::{is_json_allowed, CommandOptions, TerraformCommand};
pub use env::{EnvironmentMapping, VarFileBinding};
pub use error::{IacError, IacResult};
pub use output::{parse_terraform_json_output, TerraformOutput};
pub use params::ExecutionParameters;
pub use paths::{
    generate_mount_point, generate_random_temporary_path, save_to_random_temporary_file,
    shred_terraform_var_file, validate_directory_path,
};
pub use terraform::TerraformRunner;
