//! Human-readable Markdown report written into the vault root after a run.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::organize::is_root_target;
use crate::planner::OrganizationPlan;

pub const REPORT_FILENAME: &str = "_organization_report.md";

#[must_use]
pub fn report_path(vault: &Path) -> PathBuf {
    vault.join(REPORT_FILENAME)
}

/// The parent folder of a relative path string, `.` for root-level files.
fn parent_folder(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => ".",
    }
}

fn file_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}

/// Renders the report body: generation timestamp, folder descriptions, and a
/// movement line per plan entry whose immediate parent folder changed.
#[must_use]
pub fn render_report(plan: &OrganizationPlan, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("# Vault Organization Report\n\n");
    out.push_str(&format!(
        "Generated on: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    if !plan.folder_descriptions.is_empty() {
        out.push_str("## Folder Structure\n\n");
        for (folder, description) in &plan.folder_descriptions {
            out.push_str(&format!("### {folder}\n{description}\n\n"));
        }
    }

    out.push_str("## File Movements\n\n");
    for (current, new_folder) in &plan.organization_plan {
        // Immediate-parent comparison only, not full-path equality.
        let target = if new_folder.is_empty() { "." } else { new_folder };
        if Path::new(parent_folder(current)) != Path::new(target) {
            // Render where the file actually lands: root targets get no
            // folder prefix, matching organize::is_root_target.
            let destination = if is_root_target(new_folder) {
                file_name(current).to_string()
            } else {
                format!("{new_folder}/{}", file_name(current))
            };
            out.push_str(&format!("- `{current}` → `{destination}`\n"));
        }
    }

    out
}

/// Writes the report to `<vault>/_organization_report.md`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_report(vault: &Path, plan: &OrganizationPlan) -> Result<PathBuf> {
    let path = report_path(vault);
    fs::write(&path, render_report(plan, Local::now()))
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plan(moves: &[(&str, &str)], folders: &[(&str, &str)]) -> OrganizationPlan {
        OrganizationPlan {
            organization_plan: moves
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            folder_descriptions: folders
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }

    fn ts() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn changed_parent_gets_a_movement_line() {
        let plan = plan(&[("notes/a.md", "Projects")], &[("Projects", "Work items")]);
        let body = render_report(&plan, ts());
        assert!(body.contains("Generated on: 2026-01-02 03:04:05"));
        assert!(body.contains("### Projects\nWork items"));
        assert!(body.contains("- `notes/a.md` → `Projects/a.md`"));
    }

    #[test]
    fn unchanged_parent_is_omitted() {
        let plan = plan(&[("Projects/a.md", "Projects"), ("b.md", ".")], &[]);
        let body = render_report(&plan, ts());
        assert!(!body.contains("a.md` →"));
        assert!(!body.contains("b.md` →"));
    }

    #[test]
    fn root_targets_render_without_folder_prefix() {
        let plan = plan(&[("sub/x.md", ""), ("sub/y.md", ".")], &[]);
        let body = render_report(&plan, ts());
        assert!(body.contains("- `sub/x.md` → `x.md`"));
        assert!(body.contains("- `sub/y.md` → `y.md`"));
        assert!(!body.contains("`/x.md`"));
        assert!(!body.contains("`./y.md`"));
    }

    #[test]
    fn empty_descriptions_skip_the_folder_section() {
        let plan = plan(&[("x.md", "Inbox")], &[]);
        let body = render_report(&plan, ts());
        assert!(!body.contains("## Folder Structure"));
        assert!(body.contains("## File Movements"));
    }
}
