//! `key=value` pair parsing for secret environment variables.
//!
//! Entries are separated by newlines or `;`. The first unescaped `=` splits
//! key from value, and a backslash makes the following character literal.

use std::collections::BTreeMap;

use crate::error::{RunnerError, RunnerResult};

/// Parse `input` into a name/value mapping. Later duplicates win.
pub fn parse_key_value_pairs(input: &str) -> RunnerResult<BTreeMap<String, String>> {
    let mut pairs = BTreeMap::new();

    for entry in split_entries(input) {
        if entry.text.trim().is_empty() {
            continue;
        }
        let Some(eq) = entry.split_at else {
            return Err(RunnerError::InvalidKeyValue(format!(
                "missing '=' in entry '{}'",
                entry.text.trim()
            )));
        };

        let key = entry.text[..eq].trim();
        let value = entry.text[eq..].trim();
        if key.is_empty() {
            return Err(RunnerError::InvalidKeyValue(format!(
                "empty key in entry '{}'",
                entry.text.trim()
            )));
        }
        pairs.insert(key.to_string(), value.to_string());
    }

    Ok(pairs)
}

struct Entry {
    text: String,
    /// Byte offset in `text` where the value starts.
    split_at: Option<usize>,
}

fn split_entries(input: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut current = Entry {
        text: String::new(),
        split_at: None,
    };
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.text.push(escaped),
                None => current.text.push('\\'),
            },
            '=' if current.split_at.is_none() => current.split_at = Some(current.text.len()),
            ';' | '\n' => {
                entries.push(std::mem::replace(
                    &mut current,
                    Entry {
                        text: String::new(),
                        split_at: None,
                    },
                ));
            }
            '\r' => {}
            other => current.text.push(other),
        }
    }
    entries.push(current);
    entries
}
