//! Pre-mutation vault backup: a timestamped sibling copy of the whole tree.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::index::is_hidden_name;

/// Computes the sibling backup path: `<parent>/<name>_backup_<YYYYMMDD_HHMMSS>`.
#[must_use]
pub fn backup_dir_path(vault: &Path, now: DateTime<Local>) -> PathBuf {
    let name = vault
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vault".to_string());
    let parent = vault.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{name}_backup_{}", now.format("%Y%m%d_%H%M%S")))
}

/// Copies the vault subtree to a timestamped sibling directory, skipping
/// hidden entries. Must complete (or error) before any mutation begins; it is
/// the run's only recovery mechanism.
///
/// # Errors
///
/// Returns an error if the backup directory already exists or any copy fails.
pub fn create_backup(vault: &Path) -> Result<PathBuf> {
    let backup_dir = backup_dir_path(vault, Local::now());
    if backup_dir.exists() {
        bail!("Backup directory already exists: {}", backup_dir.display());
    }
    copy_tree(vault, &backup_dir)?;
    debug!(backup = %backup_dir.display(), "backup complete");
    Ok(backup_dir)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create backup directory {}", dst.display()))?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", src.display()))?;
        let name = entry.file_name();
        if name.to_str().is_some_and(is_hidden_name) {
            continue;
        }

        let from = entry.path();
        let to = dst.join(&name);
        let file_type = entry
            .file_type()
            .with_context(|| format!("Failed to stat {}", from.display()))?;
        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else if file_type.is_file() {
            fs::copy(&from, &to).with_context(|| {
                format!("Failed to copy {} to {}", from.display(), to.display())
            })?;
        }
        // Symlinks and specials are not note content; skip them.
    }
    Ok(())
}
