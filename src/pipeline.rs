//! Pipeline orchestration
//!
//! One run walks the fixed stage sequence: resolve, download, extract, build,
//! collect. Each stage is attempted exactly once and the first error aborts
//! the run; there are no retries. The work directory guard reclaims the
//! staging tree on every exit path, and the install root is only written
//! after the build has succeeded, so a failed run leaves any previous
//! installation exactly as it was.

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::archive::{self, ExtractedSource};
use crate::build;
use crate::collect::{self, InstalledOutputs};
use crate::config::Config;
use crate::error::{QuarryError, Result};
use crate::fetch;
use crate::layout::InstallLayout;
use crate::progress;
use crate::release::{self, ResolvedSource};
use crate::workdir::WorkDir;

/// What a completed run produced, for the final summary.
#[derive(Debug)]
pub struct PipelineReport {
    pub tag: Option<String>,
    pub installed: InstalledOutputs,
}

/// Drives one installation from release resolution to the completion marker.
pub struct Pipeline<'a> {
    config: &'a Config,
    layout: &'a InstallLayout,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, layout: &'a InstallLayout) -> Self {
        Pipeline { config, layout }
    }

    pub fn execute(&self) -> Result<PipelineReport> {
        let client = fetch::client()?;

        let (tag, source) = self.resolve(&client)?;
        let workdir = WorkDir::create(self.config.keep_workdir)?;
        let archive_path = self.download(&client, &source, &workdir)?;
        let extracted = self.extract(&archive_path, &workdir)?;
        let build_dir = self.build(&extracted)?;
        let installed = self.collect(&build_dir)?;

        Ok(PipelineReport { tag, installed })
    }

    fn resolve(&self, client: &Client) -> Result<(Option<String>, ResolvedSource)> {
        println!("Resolving latest release...");
        let pb = progress::create_stage_spinner(self.show_progress(), "Querying release metadata");
        let metadata = fetch::fetch_metadata(client, &self.config.api_url);
        progress::finish_progress_bar(pb);
        let metadata = metadata?;

        let source = release::select_source(&metadata).ok_or(QuarryError::NoDownloadableSource)?;
        if let Some(tag) = &metadata.tag_name {
            println!("Found release {tag}");
        }
        if self.config.verbose {
            println!("  source url: {}", source.url);
            println!("  file name:  {}", source.file_name);
        }
        Ok((metadata.tag_name, source))
    }

    fn download(&self, client: &Client, source: &ResolvedSource, workdir: &WorkDir) -> Result<PathBuf> {
        println!("Downloading {}...", source.file_name);
        let dest = workdir.download_path(&source.file_name);
        fetch::download(client, &source.url, &dest, self.show_progress())?;
        Ok(dest)
    }

    fn extract(&self, archive_path: &Path, workdir: &WorkDir) -> Result<ExtractedSource> {
        println!("Extracting...");
        let pb = progress::create_stage_spinner(self.show_progress(), "Extracting");
        let extracted = archive::extract(archive_path, &workdir.source_dir());
        progress::finish_progress_bar(pb);
        let extracted = extracted?;

        if !extracted.unpacked {
            println!("Download is not a recognized archive; keeping it as a single artifact");
        }
        Ok(extracted)
    }

    fn build(&self, extracted: &ExtractedSource) -> Result<PathBuf> {
        let script = build::find_build_script(&extracted.root).ok_or_else(|| {
            QuarryError::BuildScriptNotFound {
                script: build::BUILD_SCRIPT.to_string(),
                root: extracted.root.display().to_string(),
            }
        })?;
        if self.config.verbose {
            println!("Build script: {}", script.display());
        }
        println!("Running upstream build script...");
        build::run_build(&script)
    }

    fn collect(&self, build_dir: &Path) -> Result<InstalledOutputs> {
        println!("Collecting build outputs...");
        let outputs = collect::locate_outputs(build_dir, &self.config.app_name)?;
        if outputs.desktop.is_none() {
            println!("No desktop launcher found; skipping");
        }
        if outputs.icon.is_none() {
            println!("No icon found; skipping");
        }

        println!("Installing into {}...", self.layout.root().display());
        // Previous content is cleared only now, with the outputs already in
        // hand; failed runs never touch an existing installation.
        self.layout.clean()?;
        collect::install_outputs(&outputs, self.layout)
    }

    fn show_progress(&self) -> bool {
        !self.config.unattended
    }
}
