//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while preparing a container invocation.
///
/// Failures of the launched process itself are not errors at this layer;
/// they are reported through [`crate::ExecOutput::error`].
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Container runtime not available: {0}")]
    RuntimeNotAvailable(String),

    #[error("Invalid key/value pair: {0}")]
    InvalidKeyValue(String),

    #[error("Invalid environment variable name: {0}")]
    InvalidEnvName(String),

    #[error("Container image must not be empty")]
    MissingImage,

    #[error("Unable to determine current user: {0}")]
    UserLookup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
