//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// syncstate - change-detection cache for incremental syncs
///
/// Records a content hash per resource so the next sync run can skip
/// resources that did not change.
#[derive(Parser, Debug)]
#[command(name = "syncstate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SYNCSTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .syncstate.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the persisted sync state
    Show(ShowArgs),

    /// Print the last synced hash of a resource
    Get(GetArgs),

    /// Record resource hashes in a sync session
    Record(RecordArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Build directory (state file is read from its parent)
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Resource id (nested stack resources use Parent/Child)
    pub resource_id: String,

    /// Build directory (state file is read from its parent)
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,
}

/// Arguments for the record command
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Resources to record as RESOURCE_ID=HASH
    #[arg(required = true, value_parser = parse_resource_hash)]
    pub resources: Vec<(String, String)>,

    /// Build directory (state file is written to its parent)
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,

    /// Build cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Dependencies directory removed on a dependency layer mode switch
    #[arg(long)]
    pub dependencies_dir: Option<PathBuf>,

    /// Use the shared dependency layer for this session
    #[arg(long, action = ArgAction::Set)]
    pub dependency_layer: Option<bool>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the show command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one resource per line)
    Plain,
}

/// Parse a resource hash in RESOURCE_ID=HASH format
///
/// Splits on the last '=' so resource ids may contain '='.
fn parse_resource_hash(s: &str) -> Result<(String, String), String> {
    let pos = s
        .rfind('=')
        .ok_or_else(|| format!("invalid RESOURCE_ID=HASH format: no '=' found in '{s}'"))?;
    let (id, hash) = (&s[..pos], &s[pos + 1..]);
    if id.is_empty() {
        return Err(format!("missing resource id in '{s}'"));
    }
    Ok((id.to_string(), hash.to_string()))
}
