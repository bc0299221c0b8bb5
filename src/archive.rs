//! Archive extraction with suffix detection, content probing, and an opaque
//! fallback
//!
//! Downloads arrive with unreliable names, so the handler trusts the suffix
//! first, probes the bytes when the suffix says nothing, and finally stashes
//! the file unmodified rather than failing the run.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use xz2::read::XzDecoder;
use zip::ZipArchive;

use crate::error::{QuarryError, Result};

/// Subdirectory that receives a download no known format can open.
pub const OPAQUE_SUBDIR: &str = "raw";

/// Supported archive families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Detects a format from a file name suffix. Matching is
    /// case-insensitive; unknown suffixes yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar.xz") {
            Some(ArchiveFormat::TarXz)
        } else if name.ends_with(".tar") {
            Some(ArchiveFormat::Tar)
        } else if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }
}

/// Where a download ended up after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSource {
    /// Root of the tree later stages search.
    pub root: PathBuf,
    /// False when the opaque fallback was taken and nothing was unpacked.
    pub unpacked: bool,
}

/// Extracts `file` into `dest`.
///
/// The format comes from the file name suffix when recognized, otherwise
/// from probing (tar family first, then zip). A file neither route can
/// identify is moved unmodified into `dest/raw/` and reported as a
/// non-unpacked success. Extraction failures of an identified format are
/// fatal; there is no partial-extraction recovery.
pub fn extract(file: &Path, dest: &Path) -> Result<ExtractedSource> {
    std::fs::create_dir_all(dest)?;

    let format = file
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(ArchiveFormat::from_name)
        .or_else(|| probe_format(file));

    match format {
        Some(format) => {
            extract_as(file, dest, format)?;
            Ok(ExtractedSource {
                root: dest.to_path_buf(),
                unpacked: true,
            })
        }
        None => stash_opaque(file, dest),
    }
}

fn extract_as(file: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let handle = File::open(file).map_err(|e| extraction_error(file, &e))?;
    match format {
        ArchiveFormat::TarGz => Archive::new(GzDecoder::new(handle))
            .unpack(dest)
            .map_err(|e| extraction_error(file, &e)),
        ArchiveFormat::TarXz => Archive::new(XzDecoder::new(handle))
            .unpack(dest)
            .map_err(|e| extraction_error(file, &e)),
        ArchiveFormat::Tar => Archive::new(handle)
            .unpack(dest)
            .map_err(|e| extraction_error(file, &e)),
        ArchiveFormat::Zip => ZipArchive::new(handle)
            .and_then(|mut zip| zip.extract(dest))
            .map_err(|e| extraction_error(file, &e)),
    }
}

/// Identifies a format by attempting a listing, tar family before zip.
fn probe_format(file: &Path) -> Option<ArchiveFormat> {
    [
        ArchiveFormat::TarGz,
        ArchiveFormat::TarXz,
        ArchiveFormat::Tar,
        ArchiveFormat::Zip,
    ]
    .into_iter()
    .find(|&format| lists_one_entry(file, format))
}

fn lists_one_entry(file: &Path, format: ArchiveFormat) -> bool {
    let Ok(handle) = File::open(file) else {
        return false;
    };
    match format {
        ArchiveFormat::TarGz => first_tar_entry_ok(GzDecoder::new(handle)),
        ArchiveFormat::TarXz => first_tar_entry_ok(XzDecoder::new(handle)),
        ArchiveFormat::Tar => first_tar_entry_ok(handle),
        ArchiveFormat::Zip => ZipArchive::new(handle).is_ok_and(|zip| zip.len() > 0),
    }
}

fn first_tar_entry_ok<R: Read>(reader: R) -> bool {
    let mut archive = Archive::new(reader);
    match archive.entries() {
        Ok(mut entries) => matches!(entries.next(), Some(Ok(_))),
        Err(_) => false,
    }
}

/// Moves an unidentified download into `dest/raw/` untouched.
fn stash_opaque(file: &Path, dest: &Path) -> Result<ExtractedSource> {
    let file_name = file
        .file_name()
        .ok_or_else(|| extraction_error(file, &"download has no file name"))?;
    let raw_dir = dest.join(OPAQUE_SUBDIR);
    std::fs::create_dir_all(&raw_dir)?;
    std::fs::rename(file, raw_dir.join(file_name))?;
    Ok(ExtractedSource {
        root: dest.to_path_buf(),
        unpacked: false,
    })
}

fn extraction_error(file: &Path, err: &dyn std::fmt::Display) -> QuarryError {
    QuarryError::ExtractionFailed {
        path: file.display().to_string(),
        reason: err.to_string(),
    }
}
