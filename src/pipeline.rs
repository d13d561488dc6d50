//! The run sequence: index, backup, plan, confirm, reorganize, report.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use crate::anthropic::Client;
use crate::backup;
use crate::index;
use crate::organize;
use crate::planner;
use crate::report;

#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Copy the vault aside before mutating it. On by default; the backup is
    /// the run's only recovery mechanism.
    pub backup: bool,
    /// Skip the interactive confirmation prompt.
    pub assume_yes: bool,
    pub model: String,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            backup: true,
            assume_yes: false,
            model: planner::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Owns the vault path and API client for one run. Each stage borrows the
/// index and plan in turn; nothing is retained or mutated across stages.
pub struct Organizer {
    vault: PathBuf,
    client: Client,
}

impl Organizer {
    #[must_use]
    pub fn new(vault: PathBuf, client: Client) -> Self {
        Self { vault, client }
    }

    /// Runs the full pipeline. Halts without mutation when the vault has no
    /// notes, the service yields no plan, or the user declines.
    ///
    /// # Errors
    ///
    /// Returns an error on configuration, backup, or service failures. All of
    /// them occur before any file is moved.
    pub async fn run(&self, opts: &OrganizeOptions) -> Result<()> {
        println!(
            "Starting vault organization for: {}\n",
            self.vault.display()
        );

        println!("Indexing vault files...");
        let records = index::index_vault(&self.vault)?;
        println!("Indexed {} files", records.len());

        if records.is_empty() {
            println!("No markdown files found in the vault.");
            return Ok(());
        }

        if opts.backup {
            println!("Creating backup...");
            let backup_dir = backup::create_backup(&self.vault)
                .context("Failed to create vault backup")?;
            println!(
                "{}: backup created at {}\n",
                "Success".green(),
                backup_dir.display()
            );
        }

        println!("Getting organization suggestions from Claude...");
        let plan = planner::suggest_plan(&self.client, &records, &opts.model)
            .await
            .context("Failed to get organization suggestions")?;
        info!(
            mapped = plan.organization_plan.len(),
            folders = plan.folder_descriptions.len(),
            "plan received"
        );

        println!("\nProposed organization plan:");
        for (folder, description) in &plan.folder_descriptions {
            println!("\n{}: {description}", folder.cyan());
        }

        if !opts.assume_yes {
            print!("\nDo you want to proceed with the reorganization? (yes/no): ");
            io::stdout().flush()?;
            let stdin = io::stdin();
            if !confirm_reorganization(stdin.lock())? {
                println!("Reorganization cancelled.");
                return Ok(());
            }
        }

        println!("\nReorganizing vault...");
        organize::create_target_dirs(&self.vault, &plan)?;
        let summary = organize::apply_plan(&self.vault, &records, &plan);
        organize::remove_empty_dirs(&self.vault);

        let report_path = report::write_report(&self.vault, &plan)?;
        println!("Organization report saved to {}", report_path.display());

        println!(
            "Moved {} files ({} failed, {} unchanged)",
            summary.moved, summary.failed, summary.skipped
        );
        println!("{}: vault reorganization complete!", "Success".green());
        Ok(())
    }
}

/// Reads one line and accepts exactly `yes` or `y`, case-insensitive.
/// Anything else (including EOF) cancels.
///
/// # Errors
///
/// Returns an error if reading from the input fails.
pub fn confirm_reorganization(mut input: impl BufRead) -> io::Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "yes" | "y"
    ))
}
