//! Upstream build delegation
//!
//! The extracted source tree is expected to ship its own build entry point;
//! Quarry only finds it, makes it runnable, and waits for its verdict. The
//! build system behind the script stays a black box with an exit-code
//! contract.

use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::error::{QuarryError, Result};

/// Fixed name of the entry point every supported release ships.
pub const BUILD_SCRIPT: &str = "build.sh";

/// Arguments that keep the upstream build unattended and stop it from
/// launching the built app afterwards.
pub const BUILD_ARGS: &[&str] = &["--auto", "--no-launch"];

/// Locates the build script under `root`.
///
/// The walk is sorted by file name, so the same tree always yields the same
/// script; the first match wins.
pub fn find_build_script(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == BUILD_SCRIPT)
        .map(walkdir::DirEntry::into_path)
}

/// Runs the build script with the fixed unattended arguments and returns its
/// directory, where the outputs are expected to appear.
///
/// The script runs with its own directory as working directory and inherited
/// stdio, so upstream output reaches the user unparsed. A non-zero exit is
/// fatal.
pub fn run_build(script: &Path) -> Result<PathBuf> {
    let build_dir = script
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| QuarryError::IoError {
            message: format!("build script has no parent directory: {}", script.display()),
        })?;

    ensure_executable(script)?;

    let status = Command::new(script)
        .args(BUILD_ARGS)
        .current_dir(&build_dir)
        .status()
        .map_err(|e| QuarryError::IoError {
            message: format!("failed to run {}: {e}", script.display()),
        })?;

    if !status.success() {
        return Err(QuarryError::BuildFailed {
            status: status.to_string(),
        });
    }
    Ok(build_dir)
}

/// Sets the executable bits when missing; zip source archives carry no unix
/// modes, so the script often arrives as a plain file.
fn ensure_executable(script: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = std::fs::metadata(script)?.permissions();
        if permissions.mode() & 0o111 == 0 {
            permissions.set_mode(0o755);
            std::fs::set_permissions(script, permissions)?;
        }
    }
    #[cfg(not(unix))]
    {
        let _ = script;
    }
    Ok(())
}
