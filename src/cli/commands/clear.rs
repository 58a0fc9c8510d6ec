//! Clear command - remove cached entries

use super::CommandContext;
use crate::cache::CacheStore;
use crate::cli::args::ClearArgs;
use crate::error::{CacheError, CacheResult};
use console::style;
use std::io::{self, Write};
use tracing::debug;

/// Execute the clear command
pub fn execute(args: ClearArgs, ctx: &CommandContext) -> CacheResult<()> {
    let store = CacheStore::new(&ctx.cache_dir);

    if let Some(identity) = args.identity {
        if store.remove(&identity)? {
            println!("{} Removed {}", style("✓").green(), style(&identity).cyan());
        } else {
            println!("No cache entry for {}.", identity);
        }
        return Ok(());
    }

    let identities = store.list()?;
    if identities.is_empty() && !store.root().exists() {
        println!("No cache entries to clear.");
        return Ok(());
    }

    println!("This will remove {} cache entr{}:", identities.len(), if identities.len() == 1 { "y" } else { "ies" });
    for identity in &identities {
        println!("  {} {}", style("•").red(), identity);
    }
    println!();

    if !args.yes && !confirm()? {
        println!("Aborted.");
        return Ok(());
    }

    debug!("Removing {}", store.root().display());
    let removed = store.clear()?;
    println!("{} cleared {} entr{}", style("✓").green(), removed, if removed == 1 { "y" } else { "ies" });

    Ok(())
}

fn confirm() -> CacheResult<bool> {
    print!("Are you sure? [y/N] ");
    let _ = io::stdout().flush();

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| CacheError::io("reading confirmation", e))?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
