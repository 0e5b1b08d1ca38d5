//! Host-to-container path bindings exposed as environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use terrabox_runner::{Arg, ContainerConfig, MountConfig};

pub const TERRAFORM_DIR: &str = "TERRAFORM_DIR";
pub const TERRAFORM_DIR_MOUNT_POINT: &str = "TERRAFORM_DIR_MOUNT_POINT";
pub const TERRAFORM_VAR_FILE: &str = "TERRAFORM_VAR_FILE";
pub const TERRAFORM_VAR_FILE_MOUNT_POINT: &str = "TERRAFORM_VAR_FILE_MOUNT_POINT";

/// Host variable file and where it is mounted in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarFileBinding {
    pub path: PathBuf,
    pub mount_point: String,
}

/// Path bindings plus secret variables for one invocation.
///
/// The variable-file path and its mount point live in one optional binding,
/// so they are always present or absent together.
#[derive(Debug, Clone)]
pub struct EnvironmentMapping {
    dir: PathBuf,
    dir_mount_point: String,
    var_file: Option<VarFileBinding>,
    secrets: BTreeMap<String, String>,
}

impl EnvironmentMapping {
    pub fn new(dir: impl Into<PathBuf>, dir_mount_point: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            dir_mount_point: dir_mount_point.into(),
            var_file: None,
            secrets: BTreeMap::new(),
        }
    }

    pub fn with_var_file(mut self, path: impl Into<PathBuf>, mount_point: impl Into<String>) -> Self {
        self.var_file = Some(VarFileBinding {
            path: path.into(),
            mount_point: mount_point.into(),
        });
        self
    }

    pub fn with_secrets(mut self, secrets: BTreeMap<String, String>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn var_file(&self) -> Option<&VarFileBinding> {
        self.var_file.as_ref()
    }

    pub fn secrets(&self) -> &BTreeMap<String, String> {
        &self.secrets
    }

    /// The path bindings in insertion order.
    pub fn bindings(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            (TERRAFORM_DIR, self.dir.display().to_string()),
            (TERRAFORM_DIR_MOUNT_POINT, self.dir_mount_point.clone()),
        ];
        if let Some(binding) = &self.var_file {
            vars.push((TERRAFORM_VAR_FILE, binding.path.display().to_string()));
            vars.push((TERRAFORM_VAR_FILE_MOUNT_POINT, binding.mount_point.clone()));
        }
        vars
    }

    /// Bindings and secrets combined, for the subprocess environment.
    /// Secrets never shadow a binding.
    pub fn process_env(&self) -> BTreeMap<String, String> {
        let mut env = self.secrets.clone();
        env.extend(self.bindings().into_iter().map(|(k, v)| (k.to_string(), v)));
        env
    }

    /// Apply working directory and bind mounts to `config`, referencing the
    /// binding variables rather than literal paths.
    pub fn apply_mounts(&self, config: ContainerConfig) -> ContainerConfig {
        let mut config = config
            .workdir(Arg::expand(format!("${}", TERRAFORM_DIR_MOUNT_POINT)))
            .mount(MountConfig::new(
                format!("${}", TERRAFORM_DIR),
                format!("${}", TERRAFORM_DIR_MOUNT_POINT),
            ));
        if self.var_file.is_some() {
            config = config.mount(
                MountConfig::new(
                    format!("${}", TERRAFORM_VAR_FILE),
                    format!("${}", TERRAFORM_VAR_FILE_MOUNT_POINT),
                )
                .read_only(),
            );
        }
        config
    }
}
