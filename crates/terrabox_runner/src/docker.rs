//! Container command construction for Docker and Podman.
//!
//! Builds the `run` invocation as a list of discrete tokens and only joins
//! them into a shell line at the boundary with the executor.

use std::fmt;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Arg, ContainerConfig};
use crate::error::{RunnerError, RunnerResult};

/// Container runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRuntime {
    Docker,
    Podman,
}

impl ContainerRuntime {
    /// Get the CLI command name.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }

    /// Detect an available runtime, trying `preferred` first.
    pub fn detect(preferred: Option<ContainerRuntime>) -> RunnerResult<ContainerRuntime> {
        if let Some(preferred) = preferred {
            if preferred.is_available() {
                return Ok(preferred);
            }
            warn!(
                "Preferred runtime {} not available, trying alternatives",
                preferred
            );
        }

        [Self::Docker, Self::Podman]
            .into_iter()
            .find(|runtime| runtime.is_available())
            .ok_or_else(|| {
                RunnerError::RuntimeNotAvailable(
                    "Neither Docker nor Podman is available".to_string(),
                )
            })
    }

    /// Check whether the runtime CLI answers `version`.
    pub fn is_available(&self) -> bool {
        Command::new(self.command())
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

impl std::str::FromStr for ContainerRuntime {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "podman" => Ok(Self::Podman),
            other => Err(RunnerError::RuntimeNotAvailable(format!(
                "unknown container runtime '{}'",
                other
            ))),
        }
    }
}

/// A fully built command line, kept as tokens until rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<Arg>,
}

impl CommandLine {
    pub fn new(tokens: Vec<Arg>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Arg] {
        &self.tokens
    }

    /// Render as a single line for `sh -c`.
    pub fn render(&self) -> String {
        self.tokens
            .iter()
            .map(Arg::to_shell)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Builds `docker run` / `podman run` command lines.
#[derive(Debug, Clone, Copy)]
pub struct DockerCommand {
    runtime: ContainerRuntime,
}

impl DockerCommand {
    pub fn new(runtime: ContainerRuntime) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> ContainerRuntime {
        self.runtime
    }

    /// Build the run command for `config`.
    ///
    /// Forwarded variables are emitted as `-e NAME` only, so their values
    /// must be present in the environment of the process that runs the line.
    pub fn build(&self, config: &ContainerConfig) -> RunnerResult<CommandLine> {
        if config.image.trim().is_empty() {
            return Err(RunnerError::MissingImage);
        }

        let mut tokens = vec![Arg::literal(self.runtime.command()), Arg::literal("run")];

        if config.auto_remove {
            tokens.push(Arg::literal("--rm"));
        }

        if let Some(user) = &config.user {
            tokens.push(Arg::literal("-u"));
            tokens.push(Arg::literal(user));
        }

        if let Some(workdir) = &config.workdir {
            tokens.push(Arg::literal("-w"));
            tokens.push(workdir.clone());
        }

        for mount in &config.mounts {
            tokens.push(Arg::literal("-v"));
            tokens.push(Arg::expand(mount.volume()));
        }

        for name in config.env.keys() {
            validate_env_name(name)?;
            tokens.push(Arg::literal("-e"));
            tokens.push(Arg::literal(name));
        }

        tokens.extend(config.additional_args.iter().cloned());
        tokens.push(Arg::literal(&config.image));
        tokens.extend(config.command.iter().cloned());

        let line = CommandLine::new(tokens);
        debug!("Built container command: {}", line);
        Ok(line)
    }
}

fn validate_env_name(name: &str) -> RunnerResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(RunnerError::InvalidEnvName(name.to_string()))
    }
}
