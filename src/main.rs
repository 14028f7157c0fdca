//! syncstate - change-detection cache for incremental syncs
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use syncstate::cli::{Cli, Commands};
use syncstate::config::{Config, ConfigManager};
use syncstate::error::{SyncError, SyncResult};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SyncResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd =
            std::env::current_dir().map_err(|e| SyncError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Found local config: {}", path.display());
    }

    // Dispatch to command
    match cli.command {
        Commands::Show(args) => syncstate::cli::commands::show(args, &config).await,
        Commands::Get(args) => syncstate::cli::commands::get(args, &config).await,
        Commands::Record(args) => syncstate::cli::commands::record(args, &config).await,
        Commands::Config(args) => {
            syncstate::cli::commands::config(args, &config, cli.config).await
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
///
/// `general.verbose` in the config raises the floor to info.
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose.max(u8::from(config.general.verbose)) {
        0 => "syncstate=warn",
        1 => "syncstate=info",
        _ => "syncstate=debug",
    };
    let filter = EnvFilter::new(level);

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}
