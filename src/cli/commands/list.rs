//! List command - show cached identities

use super::CommandContext;
use crate::cache::CacheStore;
use crate::cli::args::{ListArgs, OutputFormat};
use crate::error::CacheResult;

/// Execute the list command
pub fn execute(args: ListArgs, ctx: &CommandContext) -> CacheResult<()> {
    let store = CacheStore::new(&ctx.cache_dir);
    let identities = store.list()?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&identities)?);
        }
        OutputFormat::Plain => {
            for identity in &identities {
                println!("{}", identity);
            }
        }
        OutputFormat::Table => {
            if identities.is_empty() {
                println!("No cache entries found.");
                return Ok(());
            }

            println!("{:<40} DIRECTORY", "IDENTITY");
            println!("{}", "-".repeat(80));
            for identity in &identities {
                let dir = store.entry_dir(identity)?;
                println!("{:<40} {}", identity, dir.display());
            }
            println!();
            println!("Total: {} entr{}", identities.len(), if identities.len() == 1 { "y" } else { "ies" });
        }
    }

    Ok(())
}
