//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// modelcache - cache generated API models across builds
///
/// Stores a generated model per application and reports whether it is
/// still valid for the current configuration and dependent files.
#[derive(Parser, Debug)]
#[command(name = "modelcache")]
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
    #[arg(short, long, global = true, env = "MODELCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .modelcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Cache base directory (overrides [cache] dir)
    #[arg(long, global = true, env = "MODELCACHE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether the stored model is still valid
    Status(StatusArgs),

    /// Store a generated model
    Store(StoreArgs),

    /// Show a stored entry
    Show(ShowArgs),

    /// List cached identities
    List(ListArgs),

    /// Remove cached entries
    Clear(ClearArgs),
}

/// Arguments for the status command
///
/// No model is needed: override scopes are probed against the stored one.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Identity of the cached subject (e.g. application name)
    pub identity: String,

    /// Dependent files, in scan order (repeatable or comma-separated)
    #[arg(short, long = "file", value_delimiter = ',', required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the store command
#[derive(Parser, Debug)]
pub struct StoreArgs {
    /// Identity of the cached subject (e.g. application name)
    pub identity: String,

    /// Generated model (JSON)
    #[arg(short, long)]
    pub model: PathBuf,

    /// Dependent files, in scan order (repeatable or comma-separated)
    #[arg(short, long = "file", value_delimiter = ',', required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Identity to show
    pub identity: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["identity", "all"])))]
pub struct ClearArgs {
    /// Identity to remove
    pub identity: Option<String>,

    /// Remove every entry
    #[arg(long)]
    pub all: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Output format for show and list
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
