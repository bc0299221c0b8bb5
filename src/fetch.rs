//! HTTP transport: release metadata fetch and asset download
//!
//! Everything here is blocking; the pipeline is a single sequential flow and
//! awaits each transfer in place.

use std::fs::File;
use std::path::Path;

use reqwest::blocking::Client;

use crate::error::{QuarryError, Result};
use crate::progress;
use crate::release::ReleaseMetadata;

/// User agent sent with every request; release hosts reject anonymous clients.
const USER_AGENT: &str = concat!("quarry/", env!("CARGO_PKG_VERSION"));

/// Builds the blocking client shared by the metadata fetch and the download.
///
/// The default request timeout is disabled: source archives from slow mirrors
/// legitimately take minutes, and there is no retry layer a timeout would feed.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(None)
        .build()
        .map_err(|e| QuarryError::IoError {
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Fetches and decodes the latest-release metadata.
pub fn fetch_metadata(client: &Client, url: &str) -> Result<ReleaseMetadata> {
    let fetch_err = |reason: String| QuarryError::MetadataFetchFailed {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| fetch_err(e.to_string()))?;
    if !response.status().is_success() {
        return Err(fetch_err(format!("HTTP {}", response.status())));
    }
    response
        .json::<ReleaseMetadata>()
        .map_err(|e| fetch_err(format!("invalid release JSON: {e}")))
}

/// Streams `url` into `dest`, with a byte progress bar when enabled.
pub fn download(client: &Client, url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let download_err = |reason: String| QuarryError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .map_err(|e| download_err(e.to_string()))?;
    if !response.status().is_success() {
        return Err(download_err(format!("HTTP {}", response.status())));
    }

    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    let pb = progress::create_download_bar(show_progress, response.content_length(), file_name);

    let mut out = File::create(dest)?;
    let copied = match pb {
        Some(ref bar) => std::io::copy(&mut bar.wrap_read(response), &mut out),
        None => {
            let mut response = response;
            std::io::copy(&mut response, &mut out)
        }
    };
    progress::finish_progress_bar(pb);
    copied.map_err(|e| download_err(e.to_string()))?;
    Ok(())
}
