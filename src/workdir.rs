//! Ephemeral work directory with guaranteed reclamation
//!
//! Every run stages its download, extraction, and build inside one temporary
//! directory. The guard removes the tree on success, failure, and panic
//! alike; the retain mode keeps it and says where it is.

use std::env;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;

/// Prefix of every work directory, so leftovers are recognizable under the
/// system temp directory.
const WORKDIR_PREFIX: &str = "quarry-";

/// Scoped staging directory for one pipeline run.
#[derive(Debug)]
pub struct WorkDir {
    dir: Option<TempDir>,
    retain: bool,
}

impl WorkDir {
    /// Creates a fresh work directory under the system temp base.
    pub fn create(retain: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKDIR_PREFIX)
            .tempdir_in(temp_dir_base())?;
        Ok(WorkDir {
            dir: Some(dir),
            retain,
        })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            // Unreachable outside Drop; kept total instead of panicking.
            None => Path::new(""),
        }
    }

    /// Where the download is stored.
    pub fn download_path(&self, file_name: &str) -> PathBuf {
        self.path().join(file_name)
    }

    /// Where the archive is extracted.
    pub fn source_dir(&self) -> PathBuf {
        self.path().join("src")
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if self.retain {
            println!("Work directory kept at {}", dir.keep().display());
        } else if let Err(e) = dir.close() {
            eprintln!("Warning: failed to remove work directory: {e}");
        }
    }
}

/// Returns a directory path suitable for creating work directories.
/// Never returns a relative path, so work trees are never created under the
/// current working directory (e.g. when TMPDIR=tmp).
fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workdir_is_absolute_and_prefixed() {
        let workdir = WorkDir::create(false).unwrap();
        assert!(workdir.path().is_absolute());
        let name = workdir.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("quarry-"), "unexpected name: {name}");
    }

    #[test]
    fn test_workdir_layout_paths() {
        let workdir = WorkDir::create(false).unwrap();
        assert_eq!(
            workdir.download_path("app.tar.gz"),
            workdir.path().join("app.tar.gz")
        );
        assert_eq!(workdir.source_dir(), workdir.path().join("src"));
    }

    #[test]
    fn test_drop_removes_the_tree() {
        let workdir = WorkDir::create(false).unwrap();
        let path = workdir.path().to_path_buf();
        std::fs::write(path.join("download"), b"bytes").unwrap();

        drop(workdir);

        assert!(!path.exists());
    }

    #[test]
    fn test_retain_keeps_the_tree() {
        let workdir = WorkDir::create(true).unwrap();
        let path = workdir.path().to_path_buf();
        std::fs::write(path.join("download"), b"bytes").unwrap();

        drop(workdir);

        assert!(path.join("download").exists());
        std::fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_temp_dir_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }
}
