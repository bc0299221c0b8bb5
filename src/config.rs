//! Run configuration assembled once at startup
//!
//! All environment input is read here, exactly once, into an explicit
//! [`Config`] value; the pipeline itself never consults the environment.
//! Value-bearing variables (`QUARRY_REPO`, `QUARRY_API_URL`, ...) arrive via
//! clap's `env` attribute on [`Cli`]; mode toggles are probed directly so a
//! bare `QUARRY_UNATTENDED=1` works the way CI systems expect.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{QuarryError, Result};

/// Base URL of the release-hosting API used when only a repo slug is given.
pub const RELEASE_API_BASE: &str = "https://api.github.com";

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Full metadata endpoint for the latest release.
    pub api_url: String,
    /// Program name expected among the build outputs.
    pub app_name: String,
    /// Absolute installation root.
    pub install_root: PathBuf,
    /// Skip prompts and replace existing installs.
    pub unattended: bool,
    /// Retain the work directory after the run.
    pub keep_workdir: bool,
    /// Use the split bin/ and applications/ layout.
    pub split_layout: bool,
    /// Verbose output.
    pub verbose: bool,
}

/// Mode toggles captured from the environment in one probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvOverrides {
    pub unattended: bool,
    pub keep_workdir: bool,
    pub split_layout: bool,
    pub ci: bool,
}

impl EnvOverrides {
    /// Reads the toggle variables. A variable set to any non-empty value
    /// counts as enabled.
    pub fn capture() -> Self {
        EnvOverrides {
            unattended: env_flag("QUARRY_UNATTENDED"),
            keep_workdir: env_flag("QUARRY_KEEP_WORKDIR"),
            split_layout: env_flag("QUARRY_SPLIT_LAYOUT"),
            ci: env_flag("CI"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|v| !v.is_empty())
}

impl Config {
    /// Assembles the configuration from the parsed CLI and the process
    /// environment. The only environment reads of the whole program happen
    /// beneath this call.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::resolve(cli, EnvOverrides::capture(), &cwd)
    }

    /// Pure resolution step, separated from [`Config::load`] so tests can
    /// exercise precedence without touching process state.
    pub fn resolve(cli: &Cli, env: EnvOverrides, cwd: &Path) -> Result<Self> {
        let repo_name = cli.repo.as_deref().map(validate_repo_slug).transpose()?;

        let api_url = match (&cli.api_url, &cli.repo) {
            (Some(url), _) => url.clone(),
            (None, Some(repo)) => {
                format!("{RELEASE_API_BASE}/repos/{repo}/releases/latest")
            }
            (None, None) => {
                return Err(QuarryError::InvalidConfig {
                    message: "no repository configured; set --repo (QUARRY_REPO) or --api-url (QUARRY_API_URL)"
                        .to_string(),
                });
            }
        };

        let app_name = match (&cli.app, repo_name) {
            (Some(app), _) if !app.is_empty() => app.clone(),
            (Some(_), _) => {
                return Err(QuarryError::InvalidConfig {
                    message: "app name must not be empty".to_string(),
                });
            }
            (None, Some(name)) => name.to_string(),
            (None, None) => {
                return Err(QuarryError::InvalidConfig {
                    message: "set --app (QUARRY_APP) when configuring --api-url without --repo"
                        .to_string(),
                });
            }
        };

        let install_root = match &cli.install_path {
            Some(path) => {
                if path.is_relative() {
                    return Err(QuarryError::InvalidConfig {
                        message: format!(
                            "install path must be absolute: {}",
                            path.display()
                        ),
                    });
                }
                path.clone()
            }
            None => {
                let dir_name = match &cli.output_dir {
                    Some(name) if !name.is_empty() => name.clone(),
                    Some(_) => {
                        return Err(QuarryError::InvalidConfig {
                            message: "output directory name must not be empty".to_string(),
                        });
                    }
                    None => app_name.clone(),
                };
                cwd.join(dir_name)
            }
        };

        Ok(Config {
            api_url,
            app_name,
            install_root,
            unattended: cli.unattended || env.unattended || env.ci,
            keep_workdir: cli.keep_workdir || env.keep_workdir,
            split_layout: cli.split_layout || env.split_layout,
            verbose: cli.verbose,
        })
    }
}

/// Checks an `owner/name` slug and returns the name segment.
fn validate_repo_slug(slug: &str) -> Result<&str> {
    let invalid = || QuarryError::InvalidConfig {
        message: format!("repository must be an owner/name slug: '{slug}'"),
    };
    let (owner, name) = slug.split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(invalid());
    }
    Ok(name)
}
