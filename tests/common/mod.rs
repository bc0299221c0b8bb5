//! Common test utilities for quarry integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

/// Environment variables the binary reads; scrubbed from every test command
/// so host settings cannot leak into a test.
const QUARRY_ENV_VARS: &[&str] = &[
    "QUARRY_REPO",
    "QUARRY_API_URL",
    "QUARRY_APP",
    "QUARRY_OUTPUT_DIR",
    "QUARRY_INSTALL_PATH",
    "QUARRY_UNATTENDED",
    "QUARRY_KEEP_WORKDIR",
    "QUARRY_SPLIT_LAYOUT",
    "CI",
];

/// Proxy variables that would reroute requests meant for the loopback mock
/// release host.
const PROXY_ENV_VARS: &[&str] = &[
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

/// A scratch directory the quarry binary runs in during integration tests
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path the binary uses as its current directory
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Command for the real quarry binary with a clean environment.
    ///
    /// The work directory base is redirected into the workspace so kept or
    /// leaked work trees are removed with the workspace.
    // Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
    #[allow(deprecated)]
    pub fn quarry_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("quarry").expect("Failed to find quarry binary");
        cmd.current_dir(&self.path);
        cmd.env("TMPDIR", &self.path);
        for var in QUARRY_ENV_VARS.iter().chain(PROXY_ENV_VARS) {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an in-memory `.tar.gz` from `(path, content, unix mode)` entries
pub fn targz_archive(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *data)
            .expect("Failed to append tar entry");
    }

    builder
        .into_inner()
        .expect("Failed to finish tar stream")
        .finish()
        .expect("Failed to finish gzip stream")
}

/// Source archive whose build script stages a binary, launcher, and icon
/// under the conventional output directories.
///
/// The script exits 64 unless called with the unattended arguments, so any
/// end-to-end success also proves the argument contract.
#[allow(dead_code)]
pub fn buildable_source(app: &str) -> Vec<u8> {
    let script = format!(
        r#"#!/bin/sh
set -e
[ "$1" = "--auto" ] || exit 64
[ "$2" = "--no-launch" ] || exit 64
mkdir -p build/bin data/icons
printf 'fresh binary %s' "{app}" > "build/bin/{app}"
chmod +x "build/bin/{app}"
printf '[Desktop Entry]\nName={app}\n' > "data/{app}.desktop"
printf 'PNG' > "data/icons/{app}.png"
"#
    );

    targz_archive(&[
        (&format!("{app}-src/build.sh"), script.as_bytes(), 0o755),
        (&format!("{app}-src/README.md"), b"upstream readme", 0o644),
    ])
}

/// Source archive whose build script prints a diagnostic and exits 3
#[allow(dead_code)]
pub fn failing_source(app: &str) -> Vec<u8> {
    let script = "#!/bin/sh\necho 'build exploded' >&2\nexit 3\n";
    targz_archive(&[(&format!("{app}-src/build.sh"), script.as_bytes(), 0o755)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }

    #[test]
    fn test_targz_archive_is_gzip() {
        let bytes = targz_archive(&[("dir/file", b"content", 0o644)]);
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }
}
