//! Quarry - install upstream apps from their latest source release
//!
//! A command line tool that resolves the newest source release of an upstream
//! project, downloads and unpacks it, runs the project's own build script, and
//! installs the produced binary, launcher, and icon into a local directory.

use clap::Parser;
use console::Style;

mod archive;
mod build;
mod cli;
mod collect;
mod config;
mod error;
mod fetch;
mod layout;
mod pipeline;
mod progress;
mod release;
mod workdir;

use cli::Cli;
use config::Config;
use error::{QuarryError, Result};
use layout::{InstallLayout, InstallLock};
use pipeline::Pipeline;

/// Decide whether the run may replace whatever occupies the install root.
///
/// An empty or missing root always passes. An occupied root passes silently
/// in unattended mode and otherwise requires confirmation; when no answer can
/// be collected the root is reported as occupied instead.
fn confirm_replace(config: &Config, layout: &InstallLayout) -> Result<bool> {
    if !layout.is_occupied() || config.unattended {
        return Ok(true);
    }

    let question = if layout.is_installed() {
        format!(
            "{} is already installed in {}. Replace it?",
            config.app_name,
            layout.root().display()
        )
    } else {
        format!(
            "{} is not empty. Replace its contents?",
            layout.root().display()
        )
    };

    inquire::Confirm::new(&question)
        .with_default(false)
        .with_help_message("Press 'y' to replace, Enter to keep what is there")
        .prompt()
        .map_err(|_| QuarryError::InstallRootOccupied {
            path: layout.root().display().to_string(),
        })
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli)?;
    let layout = InstallLayout::new(
        config.install_root.clone(),
        config.app_name.clone(),
        config.split_layout,
    );

    if !confirm_replace(&config, &layout)? {
        println!("Keeping the existing installation.");
        return Ok(());
    }

    // Held for the rest of the run; released on drop even when a stage fails.
    let _lock = InstallLock::acquire(layout.root())?;

    let report = Pipeline::new(&config, &layout).execute()?;

    println!();
    let name = Style::new().bold().apply_to(&config.app_name);
    match &report.tag {
        Some(tag) => println!("Installed {} {} to {}", name, tag, layout.root().display()),
        None => println!("Installed {} to {}", name, layout.root().display()),
    }
    if config.verbose {
        println!(
            "  {} {}",
            Style::new().bold().apply_to("binary:"),
            report.installed.binary.display()
        );
        if let Some(desktop) = &report.installed.desktop {
            println!(
                "  {} {}",
                Style::new().bold().apply_to("launcher:"),
                desktop.display()
            );
        }
        if let Some(icon) = &report.installed.icon {
            println!(
                "  {} {}",
                Style::new().bold().apply_to("icon:"),
                icon.display()
            );
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config_for(root: &std::path::Path, unattended: bool) -> Config {
        Config {
            api_url: "http://127.0.0.1:9/latest".to_string(),
            app_name: "app".to_string(),
            install_root: root.to_path_buf(),
            unattended,
            keep_workdir: false,
            split_layout: false,
            verbose: false,
        }
    }

    #[test]
    fn test_confirm_replace_passes_on_missing_root() {
        let temp = TempDir::new().unwrap();
        let root: PathBuf = temp.path().join("app");

        let config = config_for(&root, false);
        let layout = InstallLayout::new(root, "app".to_string(), false);

        assert!(confirm_replace(&config, &layout).unwrap());
    }

    #[test]
    fn test_confirm_replace_passes_on_empty_root() {
        let temp = TempDir::new().unwrap();
        let root: PathBuf = temp.path().join("app");
        std::fs::create_dir_all(&root).unwrap();

        let config = config_for(&root, false);
        let layout = InstallLayout::new(root, "app".to_string(), false);

        assert!(confirm_replace(&config, &layout).unwrap());
    }

    #[test]
    fn test_confirm_replace_skips_prompt_when_unattended() {
        let temp = TempDir::new().unwrap();
        let root: PathBuf = temp.path().join("app");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("app"), b"old binary").unwrap();

        let config = config_for(&root, true);
        let layout = InstallLayout::new(root, "app".to_string(), false);

        // Occupied root, but unattended mode proceeds without asking.
        assert!(confirm_replace(&config, &layout).unwrap());
    }
}
