//! Container invocation configuration types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single command-line token.
///
/// Literal tokens are passed through verbatim. Expandable tokens may
/// reference environment variables (`$NAME`) which the shell resolves at
/// execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Arg {
    Literal(String),
    Expand(String),
}

impl Arg {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn expand(value: impl Into<String>) -> Self {
        Self::Expand(value.into())
    }

    /// The unquoted token text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) | Self::Expand(s) => s,
        }
    }

    /// Render the token for `sh -c`.
    ///
    /// Literals are quoted with POSIX shell rules so they reach the program
    /// as exactly one word. Expandable tokens are always double-quoted so
    /// that `$NAME` is substituted but the result is never word-split.
    pub fn to_shell(&self) -> String {
        match self {
            Self::Literal(s) => shell_words::quote(s).into_owned(),
            Self::Expand(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    if matches!(c, '"' | '\\' | '`') {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                out
            }
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container bind mount. Both sides may reference environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Host path
    pub source: String,
    /// Container path
    pub target: String,
    /// Whether the mount is read-only
    pub read_only: bool,
}

impl MountConfig {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// The `-v` argument value.
    pub fn volume(&self) -> String {
        if self.read_only {
            format!("{}:{}:ro", self.source, self.target)
        } else {
            format!("{}:{}", self.source, self.target)
        }
    }
}

/// Everything needed to describe one `run` of a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Image reference including tag
    pub image: String,
    /// Command tokens passed after the image
    pub command: Vec<Arg>,
    /// Working directory inside the container
    pub workdir: Option<Arg>,
    /// Bind mounts
    pub mounts: Vec<MountConfig>,
    /// Variables forwarded into the container. Only the names appear on the
    /// command line; values travel through the launching process environment.
    pub env: BTreeMap<String, String>,
    /// User to run as (e.g., "1000:1000")
    pub user: Option<String>,
    /// Extra runtime arguments placed before the image
    pub additional_args: Vec<Arg>,
    /// Whether to remove container after execution
    pub auto_remove: bool,
}

impl ContainerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            command: Vec::new(),
            workdir: None,
            mounts: Vec::new(),
            env: BTreeMap::new(),
            user: None,
            additional_args: Vec::new(),
            auto_remove: true,
        }
    }

    pub fn command(mut self, cmd: Vec<Arg>) -> Self {
        self.command = cmd;
        self
    }

    pub fn workdir(mut self, dir: Arg) -> Self {
        self.workdir = Some(dir);
        self
    }

    pub fn mount(mut self, mount: MountConfig) -> Self {
        self.mounts.push(mount);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs(mut self, vars: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.additional_args.push(arg);
        self
    }

    pub fn auto_remove(mut self, remove: bool) -> Self {
        self.auto_remove = remove;
        self
    }
}

/// Default Terraform image used when no custom image is supplied.
pub const DEFAULT_TERRAFORM_IMAGE: &str = "hashicorp/terraform:latest";
