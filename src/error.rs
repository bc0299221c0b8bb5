//! Error types and handling for Quarry
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Quarry operations
///
/// Every variant is terminal: the pipeline stops at the first error and the
/// diagnostic code names the stage that produced it.
#[derive(Error, Diagnostic, Debug)]
pub enum QuarryError {
    // Release resolution errors
    #[error("Failed to fetch release metadata from {url}: {reason}")]
    #[diagnostic(
        code(quarry::resolve::fetch_failed),
        help("Check network connectivity and that the release endpoint is reachable")
    )]
    MetadataFetchFailed { url: String, reason: String },

    #[error("No downloadable source found in the latest release")]
    #[diagnostic(
        code(quarry::resolve::no_source),
        help("The release publishes no assets and no source archive URLs")
    )]
    NoDownloadableSource,

    // Download errors
    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(code(quarry::download::failed))]
    DownloadFailed { url: String, reason: String },

    // Extraction errors
    #[error("Failed to extract archive {path}: {reason}")]
    #[diagnostic(code(quarry::extract::failed))]
    ExtractionFailed { path: String, reason: String },

    // Build errors
    #[error("No build script named '{script}' found under {root}")]
    #[diagnostic(
        code(quarry::build::script_not_found),
        help("The release layout may have changed upstream")
    )]
    BuildScriptNotFound { script: String, root: String },

    #[error("Upstream build script failed with {status}")]
    #[diagnostic(
        code(quarry::build::failed),
        help("Re-run with --keep-workdir to inspect the build tree")
    )]
    BuildFailed { status: String },

    // Output collection errors
    #[error("No build artifacts found under {dir}")]
    #[diagnostic(
        code(quarry::collect::no_binary),
        help("The build finished but produced no executable the collector recognizes")
    )]
    NoArtifactsFound { dir: String },

    #[error("Failed to copy {from} to {to}: {reason}")]
    #[diagnostic(code(quarry::collect::copy_failed))]
    FileCopyFailed {
        from: String,
        to: String,
        reason: String,
    },

    // Install errors
    #[error("Another installation is already in progress for {path}")]
    #[diagnostic(
        code(quarry::install::in_progress),
        help("Wait for the other run to finish or remove the stale lock file")
    )]
    InstallInProgress { path: String },

    #[error("Install directory is not empty: {path}")]
    #[diagnostic(
        code(quarry::install::root_occupied),
        help("Pass --unattended to replace the existing installation")
    )]
    InstallRootOccupied { path: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(quarry::config::invalid))]
    InvalidConfig { message: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(quarry::io::error))]
    IoError { message: String },
}

impl From<std::io::Error> for QuarryError {
    fn from(err: std::io::Error) -> Self {
        QuarryError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, QuarryError>;
