//! Command executor trait and types.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Callback invoked with each chunk of stdout as it arrives.
pub type ProgressHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// A progress handler that drops every chunk.
pub fn discard_progress() -> ProgressHandler {
    Arc::new(|_chunk: &str| {})
}

/// A command line plus the explicit environment it runs with.
///
/// The environment is layered on top of the inherited process environment
/// of the child only; the parent environment is never modified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecRequest {
    pub command: String,
    pub env: BTreeMap<String, String>,
}

impl ExecRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Outcome of running a command to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecOutput {
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Hard failure reported by the executor (spawn failure, non-zero exit)
    pub error: Option<String>,
    /// Exit code, when the process ran and exited normally
    pub exit_code: Option<i32>,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
}

impl ExecOutput {
    /// Check if execution was successful.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

/// Runs command lines as subprocesses.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `request` to completion, forwarding stdout chunks to `on_progress`.
    async fn execute(&self, request: ExecRequest, on_progress: ProgressHandler) -> ExecOutput;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_request_env() {
        let request = ExecRequest::new("true")
            .env("A", "1")
            .envs([("B", "2"), ("A", "3")]);

        assert_eq!(request.env.get("A"), Some(&"3".to_string()));
        assert_eq!(request.env.get("B"), Some(&"2".to_string()));
    }

    #[test]
    fn test_exec_output_success() {
        let now = Utc::now();
        let mut output = ExecOutput {
            stdout: String::new(),
            stderr: String::new(),
            error: None,
            exit_code: Some(0),
            started_at: now,
            finished_at: now + chrono::Duration::milliseconds(25),
        };
        assert!(output.success());
        assert_eq!(output.duration_ms(), 25);

        output.error = Some("exit status 1".to_string());
        assert!(!output.success());
    }
}
