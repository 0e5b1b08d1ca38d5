//! Error types for Terraform execution.

use thiserror::Error;

/// Result type alias for Terraform operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while running a Terraform command.
#[derive(Error, Debug)]
pub enum IacError {
    /// Working directory missing or not a directory.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The variable file could not be written.
    #[error("Failed to write variable file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The executor reported a hard failure.
    #[error("Terraform execution failed: {0}")]
    Execution(String),

    /// The command produced stderr and no stdout.
    #[error("{0}")]
    Stderr(String),

    /// JSON output could not be parsed.
    #[error("Failed to parse Terraform JSON output: {0}")]
    Parse(String),

    #[error("Runner error: {0}")]
    Runner(#[from] terrabox_runner::RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
