//! Library organizing: discovery, sidecar cleanup, timestamp renaming.
//!
//! Batch extraction consumes [`find_files_with_extensions`] as its source of
//! input paths. [`organize_library`] prepares a freshly imported folder:
//! delete sidecar files (thumbnails, low-resolution previews), then rename
//! the remaining videos to a name derived from their modification time so a
//! lexicographic sort is a chronological sort. Files already carrying a
//! timestamp name are left alone unless forced.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Local};

use crate::error::FrameSiftError;

/// Options for [`organize_library`].
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Extensions of files to keep and rename (case-insensitive).
    pub valid_extensions: Vec<String>,
    /// Extensions of sidecar files to delete (case-insensitive). A path that
    /// also matches a valid extension is never deleted.
    pub delete_extensions: Vec<String>,
    /// Optional suffix appended to renamed files (e.g. `height=9m`).
    pub suffix: String,
    /// Rename even files whose names are already timestamp-formatted.
    pub force: bool,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            valid_extensions: vec!["mp4".to_string()],
            delete_extensions: vec!["lrv".to_string(), "thm".to_string()],
            suffix: String::new(),
            force: false,
        }
    }
}

/// Counts of what [`organize_library`] did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OrganizeSummary {
    /// Sidecar files deleted.
    pub deleted: u64,
    /// Files renamed to the timestamp pattern.
    pub renamed: u64,
    /// Files left alone because their names were already formatted.
    pub skipped: u64,
}

/// Recursively collect files whose extension matches one of `extensions`
/// (case-insensitive, with or without a leading dot), sorted by path.
pub fn find_files_with_extensions(
    root: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, FrameSiftError> {
    let wanted: Vec<String> = extensions
        .iter()
        .map(|extension| extension.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut matches = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(directory) = pending.pop() {
        for entry in fs::read_dir(&directory)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if extension_matches(&path, &wanted) {
                matches.push(path);
            }
        }
    }

    matches.sort();
    Ok(matches)
}

fn extension_matches(path: &Path, wanted: &[String]) -> bool {
    path.extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|extension| wanted.iter().any(|candidate| *candidate == extension))
}

/// Clean and rename a video folder in place. See the module docs for the
/// two passes. Errors on individual files are logged and skipped; only a
/// missing root directory is fatal.
pub fn organize_library(
    root: &Path,
    options: &OrganizeOptions,
) -> Result<OrganizeSummary, FrameSiftError> {
    if !root.exists() {
        return Err(FrameSiftError::FileOpen {
            path: root.to_path_buf(),
            reason: "No such file or directory".to_string(),
        });
    }

    let mut summary = OrganizeSummary::default();
    let valid: Vec<String> = options
        .valid_extensions
        .iter()
        .map(|extension| extension.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    // Pass 1: delete sidecars.
    for path in find_files_with_extensions(root, &options.delete_extensions)? {
        if extension_matches(&path, &valid) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted {}", path.display());
                summary.deleted += 1;
            }
            Err(error) => log::warn!("Could not delete {}: {error}", path.display()),
        }
    }

    // Pass 2: rename valid files to their modification timestamp.
    for path in find_files_with_extensions(root, &options.valid_extensions)? {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !options.force && is_timestamp_named(&file_name, &options.suffix) {
            summary.skipped += 1;
            continue;
        }

        let modified = match fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(error) => {
                log::warn!("Could not stat {}: {error}", path.display());
                continue;
            }
        };

        let new_name = timestamp_file_name(&path, modified, &options.suffix);
        let new_path = path.with_file_name(&new_name);
        if new_path == path {
            summary.skipped += 1;
            continue;
        }

        match fs::rename(&path, &new_path) {
            Ok(()) => {
                log::info!("Renamed {} -> {new_name}", path.display());
                summary.renamed += 1;
            }
            Err(error) => log::warn!("Could not rename {}: {error}", path.display()),
        }
    }

    Ok(summary)
}

/// Build the timestamp name for a file: the original stem up to its first
/// `_`, the modification date and time, the optional suffix, and the
/// original extension — `FIMI0001_2024-09-22_15-30-25_height=9m.MP4`.
fn timestamp_file_name(path: &Path, modified: SystemTime, suffix: &str) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = stem.split('_').next().unwrap_or(&stem).to_string();

    let local: DateTime<Local> = modified.into();
    let stamp = local.format("%Y-%m-%d_%H-%M-%S");

    let extension = path
        .extension()
        .map(|extension| format!(".{}", extension.to_string_lossy()))
        .unwrap_or_default();

    if suffix.is_empty() {
        format!("{prefix}_{stamp}{extension}")
    } else {
        format!("{prefix}_{stamp}_{suffix}{extension}")
    }
}

/// Whether a file name already contains a `YYYY-MM-DD_HH-MM-SS` stamp,
/// followed by the given suffix when one is configured.
pub(crate) fn is_timestamp_named(file_name: &str, suffix: &str) -> bool {
    let bytes = file_name.as_bytes();
    const STAMP_LEN: usize = 19;

    if bytes.len() < STAMP_LEN {
        return false;
    }

    for start in 0..=(bytes.len() - STAMP_LEN) {
        if !is_stamp(&bytes[start..start + STAMP_LEN]) {
            continue;
        }
        if suffix.is_empty() {
            return true;
        }
        // One separator character, then the suffix.
        let rest = &file_name[start + STAMP_LEN..];
        let mut characters = rest.chars();
        if characters.next().is_some() && characters.as_str().starts_with(suffix) {
            return true;
        }
    }

    false
}

/// `dddd-dd-dd_dd-dd-dd` with digits and fixed separators.
fn is_stamp(window: &[u8]) -> bool {
    debug_assert_eq!(window.len(), 19);
    window.iter().enumerate().all(|(position, byte)| match position {
        4 | 7 | 13 | 16 => *byte == b'-',
        10 => *byte == b'_',
        _ => byte.is_ascii_digit(),
    })
}
