//! modelcache - build-artifact cache for generated API models
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use modelcache::cli::commands::{self, CommandContext};
use modelcache::cli::{Cli, Commands};
use modelcache::config::ConfigManager;
use modelcache::error::{CacheError, CacheResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
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

fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("modelcache=warn"),
        1 => EnvFilter::new("modelcache=info"),
        _ => EnvFilter::new("modelcache=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        debug!("Local config discovery disabled (--no-local)");
        None
    } else {
        let cwd =
            std::env::current_dir().map_err(|e| CacheError::io("getting current directory", e))?;
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("Found local config: {}", path.display());
        }
        found
    };

    let config = config_manager.load_merged(local_config_path.as_deref())?;
    let cache_dir = ConfigManager::cache_dir(&config, cli.cache_dir.as_deref());
    debug!("Cache base directory: {}", cache_dir.display());

    let ctx = CommandContext::new(config, cache_dir);

    match cli.command {
        Commands::Status(args) => commands::status(args, &ctx),
        Commands::Store(args) => commands::store(args, &ctx),
        Commands::Show(args) => commands::show(args, &ctx),
        Commands::List(args) => commands::list(args, &ctx),
        Commands::Clear(args) => commands::clear(args, &ctx),
    }
}
