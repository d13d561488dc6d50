//! Plan application: target directory creation, best-effort file moves, and
//! the bottom-up empty-directory sweep.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::index::{FileRecord, is_hidden_name};
use crate::planner::OrganizationPlan;

/// Outcome counts for one reorganization batch. Failures are reported but do
/// not change the exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveSummary {
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// A target of `.` (or empty) means the vault root itself.
#[must_use]
pub fn is_root_target(folder: &str) -> bool {
    folder.is_empty() || folder == "."
}

/// Creates every distinct target folder named by the plan, ancestors
/// included. Idempotent: pre-existing directories are not an error.
///
/// # Errors
///
/// Returns an error if a directory cannot be created.
pub fn create_target_dirs(vault: &Path, plan: &OrganizationPlan) -> Result<()> {
    let mut targets: Vec<&str> = plan
        .organization_plan
        .values()
        .map(String::as_str)
        .filter(|folder| !is_root_target(folder))
        .collect();
    targets.sort_unstable();
    targets.dedup();

    for folder in targets {
        let dir = vault.join(folder);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        debug!(dir = %dir.display(), "created target directory");
    }
    Ok(())
}

/// Moves each record whose path is a plan key to `target_folder/filename`.
///
/// Records absent from the plan are left untouched, an intentional skip.
/// Per-file move errors are logged and counted; the batch continues.
#[must_use]
pub fn apply_plan(vault: &Path, records: &[FileRecord], plan: &OrganizationPlan) -> MoveSummary {
    let mut summary = MoveSummary::default();

    for record in records {
        let Some(new_folder) = plan.organization_plan.get(&record.full_relative_path) else {
            summary.skipped += 1;
            continue;
        };

        let dest_rel = if is_root_target(new_folder) {
            PathBuf::from(&record.filename)
        } else {
            Path::new(new_folder).join(&record.filename)
        };
        let current = vault.join(&record.full_relative_path);
        let dest = vault.join(&dest_rel);
        if current == dest {
            summary.skipped += 1;
            continue;
        }

        match move_file(&current, &dest) {
            Ok(()) => {
                println!(
                    "Moved: {} -> {}",
                    record.full_relative_path,
                    dest_rel.display()
                );
                summary.moved += 1;
            }
            Err(err) => {
                warn!(file = %record.full_relative_path, "move failed: {err}");
                println!(
                    "{}: could not move {}: {err}",
                    "Warning".yellow(),
                    record.full_relative_path
                );
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Renames `from` to `to`, falling back to copy+remove for cross-device moves.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}

#[must_use]
pub fn has_hidden_component(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => name.to_str().is_some_and(is_hidden_name),
        _ => false,
    })
}

/// Bottom-up sweep removing directories left empty by the moves.
///
/// Hidden subtrees are never descended into, and a directory that still holds
/// a hidden child reads as non-empty and is preserved. Removal failures are
/// silently ignored: this cleanup is cosmetic, best-effort only.
pub fn remove_empty_dirs(vault: &Path) {
    let walker = WalkDir::new(vault)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_entry(|entry| {
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !is_hidden_name(name))
        });

    for entry in walker.flatten() {
        if !entry.file_type().is_dir() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(vault) else {
            continue;
        };
        if has_hidden_component(rel) {
            continue;
        }
        if let Ok(mut children) = fs::read_dir(entry.path())
            && children.next().is_none()
            && fs::remove_dir(entry.path()).is_ok()
        {
            println!("Removed empty directory: {}", rel.display());
        }
    }
}
