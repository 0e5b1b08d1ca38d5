//! Run command - Execute a Terraform command in a container.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info};

use terrabox_iac::{ExecutionParameters, TerraformRunner};
use terrabox_runner::{ContainerRuntime, ProgressHandler, ShellExecutor};

#[derive(Args)]
pub struct RunArgs {
    /// Terraform command, e.g. "plan" or "terraform apply"
    #[arg(env = "TERRABOX_COMMAND")]
    command: Option<String>,

    /// Directory with the Terraform configuration (default: current directory)
    #[arg(short = 'C', long, env = "TERRABOX_WORKING_DIRECTORY")]
    working_directory: Option<PathBuf>,

    /// Input variables as a JSON object
    #[arg(long, env = "TERRABOX_VARIABLES", conflicts_with = "variables_file")]
    variables: Option<String>,

    /// Input variables from a YAML or JSON file
    #[arg(long, env = "TERRABOX_VARIABLES_FILE")]
    variables_file: Option<PathBuf>,

    /// KEY=value pairs forwarded into the container, separated by ';' or newlines
    #[arg(long, env = "TERRABOX_SECRET_ENV", hide_env_values = true)]
    secret_env: Option<String>,

    /// Stream Terraform's native output instead of parsing -json output
    #[arg(long, env = "TERRABOX_RAW_OUTPUT")]
    raw_output: bool,

    /// Container image to use instead of the default Terraform image
    #[arg(long, env = "TERRABOX_IMAGE")]
    image: Option<String>,

    /// Load parameters from a YAML or JSON file; flags override its values
    #[arg(long = "params", env = "TERRABOX_PARAMS")]
    params_file: Option<PathBuf>,

    /// Preferred container runtime (docker or podman)
    #[arg(long, env = "TERRABOX_RUNTIME")]
    runtime: Option<ContainerRuntime>,

    /// Container user (default: current uid:gid)
    #[arg(long, env = "TERRABOX_USER")]
    user: Option<String>,

    /// Print the container command without running it
    #[arg(long)]
    dry_run: bool,

    /// Extra arguments appended to the Terraform command
    #[arg(last = true)]
    additional_args: Vec<String>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let params = build_parameters(&args)?;
    info!("Running terraform {}", params.command);

    let runtime = if args.dry_run {
        args.runtime.unwrap_or(ContainerRuntime::Docker)
    } else {
        ContainerRuntime::detect(args.runtime)?
    };

    let mut runner = TerraformRunner::new(Arc::new(ShellExecutor::new()), runtime).dry_run(args.dry_run);
    if let Some(user) = &args.user {
        runner = runner.with_user(user);
    }

    let output = runner
        .execute(&params, progress_sink(params.raw_output))
        .await?;

    if !output.is_empty() {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}

/// Merge the optional parameter file with command-line flags.
fn build_parameters(args: &RunArgs) -> Result<ExecutionParameters> {
    let mut params = match &args.params_file {
        Some(path) => load_parameters(path)?,
        None => ExecutionParameters::default(),
    };

    if let Some(command) = &args.command {
        params.command = command.clone();
    }
    if params.command.trim().is_empty() {
        anyhow::bail!("Missing argument: a Terraform command is required");
    }

    if let Some(dir) = &args.working_directory {
        params.working_directory = Some(dir.clone());
    }

    if let Some(json) = &args.variables {
        let variables = serde_json::from_str(json).context("Invalid --variables option: not valid JSON")?;
        params.variables = Some(variables);
    } else if let Some(path) = &args.variables_file {
        params.variables = Some(load_structured(path)?);
    }

    if let Some(secret_env) = &args.secret_env {
        params.secret_env_variables = Some(secret_env.clone());
    }
    if args.raw_output {
        params.raw_output = true;
    }
    if let Some(image) = &args.image {
        params.custom_docker_image = Some(image.clone());
    }
    if !args.additional_args.is_empty() {
        params.additional_args = args.additional_args.clone();
    }

    Ok(params)
}

fn load_parameters(path: &Path) -> Result<ExecutionParameters> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameter file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid parameter file {}", path.display()))
}

fn load_structured(path: &Path) -> Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read variables file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid variables file {}", path.display()))
}

/// Raw output goes straight to stdout; JSON messages are only traced since
/// the parsed result is printed at the end.
fn progress_sink(raw_output: bool) -> ProgressHandler {
    if raw_output {
        Arc::new(|chunk: &str| {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(chunk.as_bytes());
            let _ = stdout.flush();
        })
    } else {
        Arc::new(|chunk: &str| debug!("{}", chunk.trim_end()))
    }
}
