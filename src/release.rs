//! Release metadata model and source-selection policy
//!
//! The policy side is deliberately pure: given decoded metadata it either
//! names exactly one URL to download or nothing at all, by walking a fixed
//! preference order. Transport lives in [`crate::fetch`].

use serde::Deserialize;

/// Asset-name suffixes preferred by the selection policy. Bare `.tar` is
/// still extractable, but never wins over these.
const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".zip", ".tar.xz"];

/// Substituted when a URL yields no usable file name.
pub const FALLBACK_FILE_NAME: &str = "release-source";

/// Final URL segments that say nothing about the file and are replaced by
/// [`FALLBACK_FILE_NAME`].
const RESERVED_NAMES: &[&str] = &["latest", "download"];

/// Characters that are unsafe in file names, replaced with hyphens.
const FILE_UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// One downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Latest-release metadata as returned by the hosting API.
///
/// Field names follow the GitHub-style release JSON; fields the pipeline does
/// not consult are ignored on decode, and every consulted field tolerates
/// absence.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseMetadata {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
    #[serde(default)]
    pub zipball_url: Option<String>,
    #[serde(default)]
    pub tarball_url: Option<String>,
}

/// The one URL the resolver settled on, with the file name the download will
/// be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub url: String,
    pub file_name: String,
}

/// Picks the download URL from release metadata.
///
/// Strict preference order, first match wins:
/// 1. the first asset whose name carries a preferred archive suffix
///    (`.tar.gz`, `.tgz`, `.zip`, `.tar.xz`),
/// 2. the first asset regardless of suffix,
/// 3. the zip source-archive URL,
/// 4. the tar source-archive URL.
///
/// `None` means the release offers nothing downloadable.
pub fn select_source(release: &ReleaseMetadata) -> Option<ResolvedSource> {
    archive_suffixed_asset(release)
        .or_else(|| first_asset(release))
        .or_else(|| source_field(release.zipball_url.as_deref()))
        .or_else(|| source_field(release.tarball_url.as_deref()))
}

fn archive_suffixed_asset(release: &ReleaseMetadata) -> Option<ResolvedSource> {
    release
        .assets
        .iter()
        .find(|asset| has_archive_suffix(&asset.name))
        .map(asset_source)
}

fn has_archive_suffix(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    ARCHIVE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn first_asset(release: &ReleaseMetadata) -> Option<ResolvedSource> {
    release.assets.first().map(asset_source)
}

fn asset_source(asset: &ReleaseAsset) -> ResolvedSource {
    ResolvedSource {
        url: asset.browser_download_url.clone(),
        file_name: download_file_name(&asset.browser_download_url),
    }
}

fn source_field(url: Option<&str>) -> Option<ResolvedSource> {
    url.filter(|u| !u.is_empty()).map(|u| ResolvedSource {
        url: u.to_string(),
        file_name: download_file_name(u),
    })
}

/// Derives the local file name for a download URL.
///
/// Takes the final path segment (query and fragment stripped), replaces
/// unsafe characters with hyphens and collapses runs of them. Empty or
/// reserved results fall back to [`FALLBACK_FILE_NAME`]; a trailing slash
/// counts as an empty segment.
pub fn download_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or("");
    let name = sanitize_file_name(segment);
    if name.is_empty() || name == "." || name == ".." || RESERVED_NAMES.contains(&name.as_str()) {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name
    }
}

/// Replaces unsafe characters with hyphens and collapses consecutive hyphens.
/// Dots are preserved so archive suffixes survive sanitization.
fn sanitize_file_name(raw: &str) -> String {
    let safe: String = raw
        .chars()
        .map(|c| {
            if FILE_UNSAFE_CHARS.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect();

    safe.split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
