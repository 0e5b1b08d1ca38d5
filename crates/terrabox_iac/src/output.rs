//! Normalization of Terraform's `-json` output.

use serde::Serialize;
use serde_json::Value;

use crate::error::{IacError, IacResult};

/// Structured result of a Terraform invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TerraformOutput {
    /// Raw-output mode, dry run, or no output at all.
    Empty,
    /// A single JSON document (`show -json`, `output -json`, ...).
    Document(Value),
    /// Newline-delimited JSON messages (`plan -json`, `apply -json`, ...).
    Stream(Vec<Value>),
}

impl TerraformOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Collapse into one JSON value. `Empty` becomes `null`.
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Document(value) => value,
            Self::Stream(values) => Value::Array(values),
        }
    }
}

/// Parse Terraform stdout as one JSON document or as JSON lines.
///
/// Every non-blank line must parse for the stream form; a single bad line
/// fails the whole parse.
pub fn parse_terraform_json_output(stdout: &str) -> IacResult<TerraformOutput> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(TerraformOutput::Empty);
    }

    if let Ok(document) = serde_json::from_str::<Value>(trimmed) {
        return Ok(TerraformOutput::Document(document));
    }

    let mut messages = Vec::new();
    for (index, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message = serde_json::from_str::<Value>(line).map_err(|e| {
            IacError::Parse(format!("line {}: {} ({})", index + 1, e, truncate(line, 80)))
        })?;
        messages.push(message);
    }

    Ok(TerraformOutput::Stream(messages))
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
