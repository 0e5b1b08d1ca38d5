//! Terraform command-line construction.

use std::fmt;

use terrabox_runner::Arg;
use tracing::warn;

use crate::env::TERRAFORM_VAR_FILE_MOUNT_POINT;
use crate::error::{IacError, IacResult};

/// Invocation name stripped from the front of a base command.
const TERRAFORM_PREFIX: &str = "terraform ";

/// Subcommands that accept `-json`.
const JSON_SUBCOMMANDS: &[&str] = &[
    "apply",
    "destroy",
    "init",
    "output",
    "plan",
    "providers schema",
    "refresh",
    "show",
    "test",
    "validate",
    "version",
];

/// Options that shape the trailing arguments of a Terraform command.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Pass the mounted variable file with `-var-file`
    pub variable_file: bool,
    /// Request machine-readable output
    pub json: bool,
    /// Extra arguments appended in order. Each entry is split into shell
    /// words, so `-var region=x` contributes two arguments.
    pub additional_args: Vec<String>,
}

/// A Terraform command line as discrete tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformCommand {
    args: Vec<Arg>,
}

impl TerraformCommand {
    /// Build the in-container command from `base_command` and `options`.
    ///
    /// A leading `terraform ` is dropped, since the image entrypoint already
    /// is the Terraform binary. The rest is split with POSIX shell quoting
    /// rules. `-json` is only added for subcommands that support it; for
    /// others a warning is logged and the flag is omitted.
    pub fn build(base_command: &str, options: &CommandOptions) -> IacResult<Self> {
        let command = base_command
            .strip_prefix(TERRAFORM_PREFIX)
            .unwrap_or(base_command);

        let words = split_words(command)?;
        let json_allowed = json_allowed_for(&words);

        let mut args: Vec<Arg> = words.into_iter().map(Arg::Literal).collect();
        for extra in &options.additional_args {
            args.extend(split_words(extra)?.into_iter().map(Arg::Literal));
        }

        if options.variable_file {
            args.push(Arg::expand(format!(
                "-var-file=${}",
                TERRAFORM_VAR_FILE_MOUNT_POINT
            )));
        }

        if options.json {
            if json_allowed {
                args.push(Arg::literal("-json"));
            } else {
                warn!("JSON output is not supported for this Terraform command: {}", command.trim());
            }
        }

        Ok(Self { args })
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn into_args(self) -> Vec<Arg> {
        self.args
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a.as_str() == flag)
    }
}

impl fmt::Display for TerraformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Vec<&str> = self.args.iter().map(Arg::as_str).collect();
        f.write_str(&text.join(" "))
    }
}

/// Whether the subcommand at the start of `command` accepts `-json`.
pub fn is_json_allowed(command: &str) -> bool {
    shell_words::split(command)
        .map(|words| json_allowed_for(&words))
        .unwrap_or(false)
}

fn json_allowed_for(words: &[String]) -> bool {
    JSON_SUBCOMMANDS.iter().any(|allowed| {
        let expected: Vec<&str> = allowed.split(' ').collect();
        words.len() >= expected.len()
            && words.iter().zip(&expected).all(|(word, want)| word == want)
    })
}

fn split_words(text: &str) -> IacResult<Vec<String>> {
    shell_words::split(text).map_err(|e| {
        IacError::Configuration(format!("Cannot parse Terraform arguments '{}': {}", text, e))
    })
}
