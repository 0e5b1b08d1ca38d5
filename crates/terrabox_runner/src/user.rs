//! Identity of the invoking host user.

use crate::error::RunnerResult;

/// Effective `uid:gid` of the current process, suitable for `-u`.
#[cfg(unix)]
pub fn current_user_id() -> RunnerResult<String> {
    // SAFETY: geteuid/getegid have no preconditions and cannot fail.
    let uid = unsafe { libc::geteuid() };
    let gid = unsafe { libc::getegid() };
    Ok(format!("{}:{}", uid, gid))
}

#[cfg(not(unix))]
pub fn current_user_id() -> RunnerResult<String> {
    Err(crate::error::RunnerError::UserLookup(
        "user identity is only available on unix hosts".to_string(),
    ))
}
