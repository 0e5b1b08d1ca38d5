//! Shell-based command executor.
//!
//! Runs a rendered command line through `sh -c`, streaming stdout to a
//! progress handler line by line while collecting both output streams.

use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::runner::{CommandExecutor, ExecOutput, ExecRequest, ProgressHandler};

/// Executor that launches commands through a POSIX shell.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different shell binary (must accept `-c`).
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, request: ExecRequest, on_progress: ProgressHandler) -> ExecOutput {
        let started_at = Utc::now();

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(&request.command)
            .envs(&request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Executing: {}", request.command);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to spawn {}: {}", self.shell, e);
                return ExecOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    error: Some(format!("Failed to spawn {}: {}", self.shell, e)),
                    exit_code: None,
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        };

        let stdout_task = tokio::spawn(stream_lines(child.stdout.take(), on_progress));
        let stderr_task = tokio::spawn(read_all(child.stderr.take()));

        let status = child.wait().await;

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();
        let finished_at = Utc::now();

        let (exit_code, error) = match status {
            Ok(status) if status.success() => (status.code(), None),
            Ok(status) => match status.code() {
                Some(code) => (
                    Some(code),
                    Some(format!("Command failed with exit code {}", code)),
                ),
                None => (None, Some("Command terminated by signal".to_string())),
            },
            Err(e) => (None, Some(format!("Failed to wait for process: {}", e))),
        };

        let output = ExecOutput {
            stdout,
            stderr,
            error,
            exit_code,
            started_at,
            finished_at,
        };

        match &output.error {
            None => info!("Command completed successfully in {}ms", output.duration_ms()),
            Some(message) => error!("{} after {}ms", message, output.duration_ms()),
        }

        output
    }
}

/// Read `handle` line by line, forwarding each line to `on_progress`.
async fn stream_lines<R: AsyncRead + Unpin>(
    handle: Option<R>,
    on_progress: ProgressHandler,
) -> String {
    let mut output = String::new();
    let Some(handle) = handle else {
        return output;
    };

    let mut reader = BufReader::new(handle);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let chunk = String::from_utf8_lossy(&buf);
                on_progress(chunk.as_ref());
                output.push_str(&chunk);
            }
            Err(e) => {
                debug!("stdout read stopped: {}", e);
                break;
            }
        }
    }
    output
}

async fn read_all<R: AsyncRead + Unpin>(handle: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        if let Err(e) = h.read_to_end(&mut buf).await {
            debug!("stderr read stopped: {}", e);
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
