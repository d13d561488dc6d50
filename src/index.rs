//! Vault indexing: recursive walk producing one record per note file.

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{OrganizerError, Result};

/// Recognized note extension. Exact match, not case-folded.
pub const NOTE_EXTENSION: &str = "md";

/// Hidden entries are detected by name prefix, never platform attributes,
/// so `.obsidian` and friends are skipped identically on every OS.
pub const HIDDEN_MARKER: char = '.';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub filename: String,
    pub current_folder: String,
    pub full_relative_path: String,
    pub size: u64,
}

#[must_use]
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// Indexes every non-hidden `.md` file under `root`.
///
/// Hidden directories are not descended into. Entries are returned in
/// file-name order per directory level, with `/`-separated relative paths.
/// An empty result is a valid outcome, not an error.
///
/// # Errors
///
/// Returns [`OrganizerError::InvalidVault`] if `root` is not a directory.
pub fn index_vault(root: &Path) -> Result<Vec<FileRecord>> {
    if !root.is_dir() {
        return Err(OrganizerError::InvalidVault {
            path: root.to_path_buf(),
        });
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false) // hidden filtering is our own name-prefix check below
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(std::ffi::OsStr::cmp);
    builder.filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        entry
            .file_name()
            .to_str()
            .is_none_or(|name| !is_hidden_name(name))
    });

    let mut records = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Walk error: {err}");
                continue;
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(NOTE_EXTENSION) {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        let filename = entry.file_name().to_string_lossy().into_owned();
        let current_folder = match rel.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => ".".to_string(),
        };
        let size = match entry.metadata() {
            Ok(md) => md.len(),
            Err(err) => {
                warn!("Skipping {rel}: {err}");
                continue;
            }
        };

        records.push(FileRecord {
            filename,
            current_folder,
            full_relative_path: rel,
            size,
        });
    }

    debug!(count = records.len(), "indexed vault");
    Ok(records)
}
