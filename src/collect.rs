//! Build-output discovery and installation
//!
//! Upstream builds drop their outputs wherever their tooling likes; the
//! collector checks the conventional places first and widens the search only
//! when they come up empty. Artifacts are copied, never moved, so the build
//! tree stays intact for inspection with `--keep-workdir`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::build::BUILD_SCRIPT;
use crate::error::{QuarryError, Result};
use crate::layout::InstallLayout;

/// Conventional binary output directories, checked in order before any
/// recursive search.
const BINARY_DIRS: &[&str] = &["build/bin", "bin"];

/// Directories that may hold the desktop launcher, relative to the build
/// directory. The empty entry is the build directory itself.
const DESKTOP_DIRS: &[&str] = &["", "data", "resources", "build"];

/// Icon candidates as (directory, extension) pairs, relative to the build
/// directory.
const ICON_CANDIDATES: &[(&str, &str)] = &[
    ("data/icons", "png"),
    ("data/icons", "svg"),
    ("data", "png"),
    ("icons", "png"),
    ("", "png"),
];

/// Outputs located in the build tree. Only the binary is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutputSet {
    pub binary: PathBuf,
    pub desktop: Option<PathBuf>,
    pub icon: Option<PathBuf>,
}

/// Destination paths after installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledOutputs {
    pub binary: PathBuf,
    pub desktop: Option<PathBuf>,
    pub icon: Option<PathBuf>,
}

/// Finds the binary, launcher, and icon under `build_dir`.
///
/// Binary search order: `build/bin/`, then `bin/`, then a recursive search
/// for an executable named `app_name`, then any executable in the tree. The
/// first step with a hit wins. Launcher and icon are optional; their absence
/// is reported by the caller, not an error.
pub fn locate_outputs(build_dir: &Path, app_name: &str) -> Result<BuildOutputSet> {
    let binary =
        locate_binary(build_dir, app_name).ok_or_else(|| QuarryError::NoArtifactsFound {
            dir: build_dir.display().to_string(),
        })?;

    Ok(BuildOutputSet {
        binary,
        desktop: locate_desktop(build_dir, app_name),
        icon: locate_icon(build_dir, app_name),
    })
}

fn locate_binary(build_dir: &Path, app_name: &str) -> Option<PathBuf> {
    BINARY_DIRS
        .iter()
        .find_map(|dir| pick_from_dir(&build_dir.join(dir), app_name))
        .or_else(|| find_named_executable(build_dir, app_name))
        .or_else(|| find_any_executable(build_dir))
}

/// Picks from the executables directly inside `dir`: the one named after the
/// app when present, otherwise the first in name order.
fn pick_from_dir(dir: &Path, app_name: &str) -> Option<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_executable(path))
        .collect();
    found.sort();

    found
        .iter()
        .find(|path| path.file_name().is_some_and(|n| n == app_name))
        .or_else(|| found.first())
        .cloned()
}

fn find_named_executable(build_dir: &Path, app_name: &str) -> Option<PathBuf> {
    sorted_walk(build_dir)
        .find(|path| path.file_name().is_some_and(|n| n == app_name) && is_executable(path))
}

/// Last resort: any executable in the tree, the entry-point script excepted.
fn find_any_executable(build_dir: &Path) -> Option<PathBuf> {
    sorted_walk(build_dir).find(|path| {
        path.file_name().is_none_or(|n| n != BUILD_SCRIPT) && is_executable(path)
    })
}

fn sorted_walk(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
}

fn locate_desktop(build_dir: &Path, app_name: &str) -> Option<PathBuf> {
    DESKTOP_DIRS
        .iter()
        .map(|dir| build_dir.join(dir).join(format!("{app_name}.desktop")))
        .find(|path| path.is_file())
}

fn locate_icon(build_dir: &Path, app_name: &str) -> Option<PathBuf> {
    ICON_CANDIDATES
        .iter()
        .map(|(dir, ext)| build_dir.join(dir).join(format!("{app_name}.{ext}")))
        .find(|path| path.is_file())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}

/// Copies the located outputs into the layout and stamps the completion
/// marker as the very last step.
pub fn install_outputs(outputs: &BuildOutputSet, layout: &InstallLayout) -> Result<InstalledOutputs> {
    let binary = layout.binary_path();
    copy_artifact(&outputs.binary, &binary)?;

    let desktop = match &outputs.desktop {
        Some(source) => {
            let dest = layout.desktop_path();
            copy_artifact(source, &dest)?;
            Some(dest)
        }
        None => None,
    };

    let icon = match &outputs.icon {
        Some(source) => {
            let file_name = source.file_name().ok_or_else(|| QuarryError::IoError {
                message: format!("icon has no file name: {}", source.display()),
            })?;
            let dest = layout.icon_dir().join(file_name);
            copy_artifact(source, &dest)?;
            Some(dest)
        }
        None => None,
    };

    layout.write_marker()?;

    Ok(InstalledOutputs {
        binary,
        desktop,
        icon,
    })
}

fn copy_artifact(from: &Path, to: &Path) -> Result<()> {
    ensure_parent_dir(to)?;
    std::fs::copy(from, to).map_err(|e| QuarryError::FileCopyFailed {
        from: from.display().to_string(),
        to: to.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
