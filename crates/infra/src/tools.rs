//! Helpers for locating and running command line tools

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace, warn};

use analog_media_core::domain::device::{DeviceError, Result};

/// Locate `name` on `PATH`, or check it directly when it contains a slash
pub fn find_executable(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let path = PathBuf::from(name);
        return is_executable(&path).then_some(path);
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Run a listing tool and return its stdout
///
/// A non-zero exit with usable output is logged and the output kept; tools such
/// as `v4l2-ctl` fail when one node cannot be opened but still list the rest.
pub fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    trace!(program, ?args, "Running tool");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| DeviceError::EnumerationFailure(format!("{} not available: {}", program, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stdout.trim().is_empty() {
            return Err(DeviceError::EnumerationFailure(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }
        warn!(program, status = %output.status, "Tool reported an error, using partial output");
    }

    debug!(program, bytes = stdout.len(), "Tool finished");
    Ok(stdout)
}
