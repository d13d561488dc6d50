use anyhow::{Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vault_organizer::anthropic::{AnthropicConfig, Client};
use vault_organizer::pipeline::{OrganizeOptions, Organizer};
use vault_organizer::planner;

#[derive(Parser)]
#[command(name = "vault-organizer")]
#[command(about = "Organize a Markdown note vault using Claude AI")]
#[command(version)]
struct Cli {
    /// Path to the vault directory
    vault: std::path::PathBuf,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Skip creating a backup before reorganizing
    #[arg(long)]
    no_backup: bool,

    /// Proceed without the interactive confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Model to request the plan from
    #[arg(long, default_value = planner::DEFAULT_MODEL)]
    model: String,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    info!("Starting vault-organizer v{}", env!("CARGO_PKG_VERSION"));

    // Reject a bad vault path before any stage runs.
    if !cli.vault.exists() || !cli.vault.is_dir() {
        bail!("{} is not a valid directory", cli.vault.display());
    }

    let client = Client::with_config(AnthropicConfig::new().with_api_key(cli.api_key));
    let organizer = Organizer::new(cli.vault, client);

    organizer
        .run(&OrganizeOptions {
            backup: !cli.no_backup,
            assume_yes: cli.yes,
            model: cli.model,
        })
        .await
}
