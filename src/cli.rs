//! CLI definitions using clap derive API
//!
//! Quarry takes no subcommands and no positional arguments: a bare invocation
//! runs the whole pipeline. Every value flag mirrors a `QUARRY_*` environment
//! variable so CI setups can configure runs without touching the command line.

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// Quarry - source-release installer
///
/// Resolves the latest upstream release, downloads and extracts it, runs the
/// project's own build script unattended, and installs the produced outputs.
#[derive(Parser, Debug)]
#[command(
    name = "quarry",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Fetch an upstream app's latest source release, run its build script, install the outputs",
    long_about = "Quarry queries a release-hosting API for the latest release, picks the best \
                  downloadable source archive, extracts it, delegates the build to the project's \
                  own build script, and installs the resulting binary (plus desktop launcher and \
                  icon, when present) into a local directory.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  quarry --repo upstream/app                \x1b[90m# Install into ./app\x1b[0m\n    \
                  quarry --repo upstream/app --unattended   \x1b[90m# No prompts, replace existing\x1b[0m\n    \
                  QUARRY_REPO=upstream/app quarry           \x1b[90m# Same, configured via env\x1b[0m\n    \
                  quarry --repo upstream/app --split-layout \x1b[90m# bin/ and applications/ subtrees\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Repository slug on the release host
    #[arg(long, env = "QUARRY_REPO", value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Full release-metadata endpoint, overriding the one derived from --repo
    #[arg(long, env = "QUARRY_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Program name to look for among the build outputs (defaults to the repo name)
    #[arg(long, env = "QUARRY_APP", value_name = "NAME")]
    pub app: Option<String>,

    /// Name of the install directory created under the current directory
    #[arg(long, env = "QUARRY_OUTPUT_DIR", value_name = "NAME")]
    pub output_dir: Option<String>,

    /// Absolute install path, overriding --output-dir entirely
    #[arg(long, env = "QUARRY_INSTALL_PATH", value_name = "PATH")]
    pub install_path: Option<PathBuf>,

    /// Never prompt; replace an existing installation (QUARRY_UNATTENDED, implied by CI)
    #[arg(long)]
    pub unattended: bool,

    /// Keep the temporary work directory instead of removing it (QUARRY_KEEP_WORKDIR)
    #[arg(long)]
    pub keep_workdir: bool,

    /// Install into separate bin/ and applications/ subtrees (QUARRY_SPLIT_LAYOUT)
    #[arg(long)]
    pub split_layout: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
