//! Temporary path generation and the variable-file lifecycle.
//!
//! Variable files hold secrets, so they are created owner-only and are
//! overwritten with random bytes before being unlinked.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{IacError, IacResult};

/// File-name prefix shared by every generated path.
pub const TEMP_PREFIX: &str = "terrabox-";

/// Extension that makes Terraform read a variable file as JSON.
pub const VAR_FILE_EXTENSION: &str = ".tfvars.json";

/// Temp directory used for paths inside the container.
pub const CONTAINER_TEMP_DIR: &str = "/tmp";

const SHRED_BLOCK_SIZE: usize = 8192;

/// Fail with a configuration error unless `path` is an existing directory.
pub fn validate_directory_path(path: &Path) -> IacResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(IacError::Configuration(format!(
            "Path {} is not a directory",
            path.display()
        ))),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(IacError::Configuration(format!(
            "Path {} does not exist",
            path.display()
        ))),
        Err(e) => Err(IacError::Configuration(format!(
            "Path {} is not accessible: {}",
            path.display(),
            e
        ))),
    }
}

/// A fresh, unique path under the host temp directory. Nothing is created.
pub fn generate_random_temporary_path() -> PathBuf {
    random_path_in(&std::env::temp_dir(), "")
}

/// A fresh, unique absolute path under the container temp directory.
pub fn generate_mount_point(extension: &str) -> String {
    format!(
        "{}/{}{}{}",
        CONTAINER_TEMP_DIR,
        TEMP_PREFIX,
        Uuid::new_v4().simple(),
        extension
    )
}

fn random_path_in(dir: &Path, extension: &str) -> PathBuf {
    dir.join(format!("{}{}{}", TEMP_PREFIX, Uuid::new_v4().simple(), extension))
}

/// Serialize `data` as a Terraform JSON variable file at a new temp path.
pub fn save_to_random_temporary_file(data: &serde_json::Value) -> IacResult<PathBuf> {
    let path = random_path_in(&std::env::temp_dir(), VAR_FILE_EXTENSION);
    let contents = serde_json::to_vec_pretty(data)?;

    write_new_file(&path, &contents).map_err(|source| IacError::Write {
        path: path.display().to_string(),
        source,
    })?;

    debug!("Wrote variable file {}", path.display());
    Ok(path)
}

fn write_new_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Overwrite the file at `path` with random bytes, then delete it.
///
/// A file that is already gone is logged and treated as success, so calling
/// this twice is harmless.
pub fn shred_terraform_var_file(path: &Path) -> IacResult<()> {
    let mut file = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Variable file {} already removed", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut remaining = file.metadata()?.len() as usize;
    let mut block = vec![0u8; SHRED_BLOCK_SIZE.min(remaining.max(1))];
    let mut rng = rand::rng();
    while remaining > 0 {
        let n = remaining.min(block.len());
        rng.fill_bytes(&mut block[..n]);
        file.write_all(&block[..n])?;
        remaining -= n;
    }
    file.sync_all()?;
    drop(file);

    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Shredded variable file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Variable file {} vanished before removal", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
