//! Terraform runner for containerized execution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use terrabox_runner::{
    current_user_id, parse_key_value_pairs, CommandExecutor, ContainerConfig, ContainerRuntime,
    DockerCommand, ExecOutput, ExecRequest, ProgressHandler, DEFAULT_TERRAFORM_IMAGE,
};

use crate::command::{CommandOptions, TerraformCommand};
use crate::env::EnvironmentMapping;
use crate::error::{IacError, IacResult};
use crate::output::{parse_terraform_json_output, TerraformOutput};
use crate::params::ExecutionParameters;
use crate::paths::{
    generate_mount_point, save_to_random_temporary_file, shred_terraform_var_file,
    validate_directory_path, VAR_FILE_EXTENSION,
};

/// Terraform runner that executes commands in containers.
pub struct TerraformRunner {
    executor: Arc<dyn CommandExecutor>,
    runtime: ContainerRuntime,
    user: Option<String>,
    dry_run: bool,
}

impl TerraformRunner {
    /// Create a new Terraform runner.
    pub fn new(executor: Arc<dyn CommandExecutor>, runtime: ContainerRuntime) -> Self {
        Self {
            executor,
            runtime,
            user: None,
            dry_run: false,
        }
    }

    /// Run the container as `user` instead of the current host user.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Build everything but log the container command instead of running it.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Run one Terraform command described by `params`.
    ///
    /// Stdout chunks are forwarded to `on_progress` while the container runs.
    /// A variable file created for this call is shredded before returning,
    /// whatever the outcome.
    pub async fn execute(
        &self,
        params: &ExecutionParameters,
        on_progress: ProgressHandler,
    ) -> IacResult<TerraformOutput> {
        let dir = resolve_working_directory(params.working_directory.as_deref())?;
        info!("Running terraform {} in {:?}", params.command, dir);

        let mut env = EnvironmentMapping::new(dir, generate_mount_point(""));
        if let Some(variables) = &params.variables {
            let path = save_to_random_temporary_file(variables)?;
            env = env.with_var_file(path, generate_mount_point(VAR_FILE_EXTENSION));
        }

        let outcome = self.run_in_container(params, &env, on_progress).await;

        if let Some(binding) = env.var_file() {
            if let Err(e) = shred_terraform_var_file(&binding.path) {
                warn!("Failed to shred variable file {}: {}", binding.path.display(), e);
            }
        }

        match outcome? {
            Some(output) => normalize_output(output, params.raw_output),
            None => Ok(TerraformOutput::Empty),
        }
    }

    /// Build and run the container command. `None` means dry run.
    async fn run_in_container(
        &self,
        params: &ExecutionParameters,
        env: &EnvironmentMapping,
        on_progress: ProgressHandler,
    ) -> IacResult<Option<ExecOutput>> {
        let command = TerraformCommand::build(
            &params.command,
            &CommandOptions {
                variable_file: env.var_file().is_some(),
                json: !params.raw_output,
                additional_args: params.additional_args.clone(),
            },
        )?;
        debug!("Terraform command: {}", command);

        let secrets = match params.secret_env_variables.as_deref() {
            Some(pairs) => parse_key_value_pairs(pairs)?,
            None => Default::default(),
        };
        let env = env.clone().with_secrets(secrets);

        let user = match &self.user {
            Some(user) => user.clone(),
            None => current_user_id()?,
        };

        let image = params
            .custom_docker_image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .unwrap_or(DEFAULT_TERRAFORM_IMAGE);

        let config = ContainerConfig::new(image)
            .user(user)
            .envs(env.secrets())
            .command(command.into_args());
        let config = env.apply_mounts(config);

        let line = DockerCommand::new(self.runtime).build(&config)?;

        if self.dry_run {
            info!("[DRY-RUN] Would execute: {}", line);
            return Ok(None);
        }

        let request = ExecRequest::new(line.render()).envs(env.process_env());
        Ok(Some(self.executor.execute(request, on_progress).await))
    }
}

/// Absolute, normalized form of `dir` (or the current directory), which must
/// be an existing directory.
fn resolve_working_directory(dir: Option<&Path>) -> IacResult<PathBuf> {
    let resolved = match dir {
        Some(dir) => std::path::absolute(dir),
        None => std::env::current_dir(),
    }
    .map_err(|e| IacError::Configuration(format!("Cannot resolve working directory: {}", e)))?;

    validate_directory_path(&resolved)?;

    resolved.canonicalize().map_err(|e| {
        IacError::Configuration(format!(
            "Cannot resolve working directory {}: {}",
            resolved.display(),
            e
        ))
    })
}

/// Classify the executor outcome and parse stdout when JSON was requested.
fn normalize_output(output: ExecOutput, raw_output: bool) -> IacResult<TerraformOutput> {
    if let Some(error) = output.error {
        if !raw_output {
            warn!("RECOMMENDATION: Try enabling raw output for a more meaningful error message.");
        }
        let stderr = output.stderr.trim();
        return Err(IacError::Execution(if stderr.is_empty() {
            error
        } else {
            format!("{}: {}", error, stderr)
        }));
    }

    let has_stderr = !output.stderr.trim().is_empty();
    if has_stderr && output.stdout.trim().is_empty() {
        return Err(IacError::Stderr(output.stderr));
    }
    if has_stderr {
        warn!("{}", output.stderr.trim_end());
    }

    if raw_output {
        return Ok(TerraformOutput::Empty);
    }
    parse_terraform_json_output(&output.stdout)
}
