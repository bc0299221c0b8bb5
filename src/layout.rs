//! Install destination layout, pre-flight occupancy checks, and the
//! single-flight lock

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::{QuarryError, Result};

/// Zero-byte file stamped into the install root when a run completes.
pub const COMPLETION_MARKER: &str = ".installed";

/// Destination structure for collected outputs.
///
/// Flat mode puts the binary and launcher directly in the root; split mode
/// separates them into `bin/` and `applications/` subtrees. Icons live under
/// `data/icons/` in both modes.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
    app_name: String,
    split: bool,
}

impl InstallLayout {
    pub fn new(root: PathBuf, app_name: String, split: bool) -> Self {
        InstallLayout {
            root,
            app_name,
            split,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination of the installed binary, named after the app.
    pub fn binary_path(&self) -> PathBuf {
        if self.split {
            self.root.join("bin").join(&self.app_name)
        } else {
            self.root.join(&self.app_name)
        }
    }

    /// Destination of the desktop launcher.
    pub fn desktop_path(&self) -> PathBuf {
        let file_name = format!("{}.desktop", self.app_name);
        if self.split {
            self.root.join("applications").join(file_name)
        } else {
            self.root.join(file_name)
        }
    }

    /// Directory receiving the icon, same in both modes.
    pub fn icon_dir(&self) -> PathBuf {
        self.root.join("data").join("icons")
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(COMPLETION_MARKER)
    }

    /// True when a previous run completed into this root.
    pub fn is_installed(&self) -> bool {
        self.marker_path().is_file()
    }

    /// True when the root holds anything at all, finished install or not.
    pub fn is_occupied(&self) -> bool {
        match std::fs::read_dir(&self.root) {
            Ok(mut entries) => entries.next().is_some(),
            Err(_) => self.root.exists(),
        }
    }

    /// Removes any previous content, leaving an empty root. Handles a root
    /// that exists as a plain file as well.
    pub fn clean(&self) -> Result<()> {
        if self.root.is_dir() {
            std::fs::remove_dir_all(&self.root)?;
        } else if self.root.exists() {
            std::fs::remove_file(&self.root)?;
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Stamps the completion marker. Called only after every artifact copy
    /// succeeded; the marker's presence means the install is whole.
    pub fn write_marker(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.marker_path(), b"")?;
        Ok(())
    }
}

/// Guard holding the single-flight lock beside the install root.
///
/// The lock file is created exclusively, so a second run against the same
/// root fails fast instead of interleaving writes. Dropping the guard
/// releases the lock on every exit path.
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
}

impl InstallLock {
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = lock_path(root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(InstallLock { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(QuarryError::InstallInProgress {
                    path: root.display().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        // Best effort; a leftover lock surfaces as InstallInProgress on the
        // next run and can be removed by hand.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// The lock lives beside the root, not inside it, so cleaning the root never
/// releases a lock another process holds.
fn lock_path(root: &Path) -> PathBuf {
    let mut name = root
        .file_name()
        .map_or_else(|| std::ffi::OsString::from("install"), |n| n.to_os_string());
    name.push(".lock");
    root.with_file_name(name)
}
