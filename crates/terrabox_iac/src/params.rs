//! Input record for one Terraform invocation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for a single containerized Terraform run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecutionParameters {
    /// Host directory with the Terraform configuration (default: cwd)
    pub working_directory: Option<PathBuf>,
    /// Terraform command, with or without the `terraform ` prefix
    pub command: String,
    /// Input variables, written to a temporary `.tfvars.json` file
    pub variables: Option<Value>,
    /// `KEY=value` pairs forwarded into the container environment
    pub secret_env_variables: Option<String>,
    /// Stream native output instead of parsing `-json` output
    pub raw_output: bool,
    /// Extra arguments appended to the command, in order
    pub additional_args: Vec<String>,
    /// Image to run instead of the default Terraform image
    pub custom_docker_image: Option<String>,
}

impl ExecutionParameters {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn secret_env_variables(mut self, pairs: impl Into<String>) -> Self {
        self.secret_env_variables = Some(pairs.into());
        self
    }

    pub fn raw_output(mut self, raw: bool) -> Self {
        self.raw_output = raw;
        self
    }

    pub fn additional_arg(mut self, arg: impl Into<String>) -> Self {
        self.additional_args.push(arg.into());
        self
    }

    pub fn custom_docker_image(mut self, image: impl Into<String>) -> Self {
        self.custom_docker_image = Some(image.into());
        self
    }
}
