//! Mock command executor for testing.
//!
//! Provides a configurable implementation of the [`CommandExecutor`] trait
//! for use in tests without requiring Docker/Podman or a shell.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::runner::{CommandExecutor, ExecOutput, ExecRequest, ProgressHandler};

/// Predefined mock response for an execution.
#[derive(Debug, Clone, Default)]
pub struct MockResponse {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
    pub exit_code: Option<i32>,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            error: Some(format!("Command failed with exit code {}", exit_code)),
            exit_code: Some(exit_code),
            ..Default::default()
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub command: String,
    pub env: BTreeMap<String, String>,
    /// Variable-file paths from `env` that existed on disk at call time.
    pub existing_files: Vec<String>,
}

/// Mock executor for testing.
///
/// Captures every request and replays predefined responses in order,
/// cycling once the list is exhausted. Stdout of each response is fed to the
/// progress handler line by line, like the shell executor does.
#[derive(Clone, Default)]
pub struct MockExecutor {
    responses: Arc<RwLock<Vec<MockResponse>>>,
    response_index: Arc<AtomicUsize>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    watched_env: Arc<RwLock<Vec<String>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mock response for the next call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Record whether the file named by env var `key` exists when called.
    pub fn watch_file_env(self, key: impl Into<String>) -> Self {
        self.watched_env.write().push(key.into());
        self
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses[index % responses.len()].clone()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, request: ExecRequest, on_progress: ProgressHandler) -> ExecOutput {
        let existing_files = self
            .watched_env
            .read()
            .iter()
            .filter_map(|key| request.env.get(key))
            .filter(|path| std::path::Path::new(path).exists())
            .cloned()
            .collect();

        self.captured_calls.write().push(CapturedCall {
            command: request.command.clone(),
            env: request.env.clone(),
            existing_files,
        });

        let response = self.next_response();
        let started_at = Utc::now();
        for line in response.stdout.split_inclusive('\n') {
            on_progress(line);
        }

        ExecOutput {
            stdout: response.stdout,
            stderr: response.stderr,
            error: response.error,
            exit_code: response.exit_code,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
