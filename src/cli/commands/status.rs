//! Status command - check whether the stored model can be reused

use super::CommandContext;
use crate::cache::CacheEntry;
use crate::cli::args::StatusArgs;
use crate::error::CacheResult;
use crate::model::ApiModel;
use console::style;

/// Outcome of comparing current inputs against the stored entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing usable is stored
    Miss,
    /// Stored model can be reused
    UpToDate,
    /// Stored model is outdated; carries the reasons
    Stale(Vec<String>),
}

/// Compare the current config and files against the stored entry
pub fn check(args: &StatusArgs, ctx: &CommandContext) -> CacheResult<Freshness> {
    let current = ctx.current_entry(&args.identity, &args.files)?;

    let Some(stored) = CacheEntry::<ApiModel>::read(&args.identity, &ctx.cache_dir) else {
        return Ok(Freshness::Miss);
    };

    if stored.is_up_to_date_with(&current)? {
        return Ok(Freshness::UpToDate);
    }

    let mut reasons = Vec::new();
    if let (Some(before), Some(after)) = (
        stored.stored_snapshot(),
        current.finalize_snapshot(stored.artifact()),
    ) {
        reasons.extend(
            before
                .changed_keys(&after)
                .into_iter()
                .map(|key| format!("config {key}")),
        );
    }
    if stored.fingerprints() != current.fingerprints() {
        reasons.push("dependent files".to_string());
    }

    Ok(Freshness::Stale(reasons))
}

/// Execute the status command
pub fn execute(args: StatusArgs, ctx: &CommandContext) -> CacheResult<()> {
    if !ctx.config.cache.enabled {
        println!(
            "{} Caching is disabled ([cache] enabled = false)",
            style("!").yellow()
        );
        return Ok(());
    }

    match check(&args, ctx)? {
        Freshness::Miss => println!(
            "{} {} miss (nothing cached)",
            style("○").dim(),
            style(&args.identity).cyan()
        ),
        Freshness::UpToDate => println!(
            "{} {} up to date",
            style("✓").green(),
            style(&args.identity).cyan()
        ),
        Freshness::Stale(reasons) => {
            println!(
                "{} {} stale",
                style("~").yellow(),
                style(&args.identity).cyan()
            );
            for reason in reasons {
                println!("  {} {}", style("•").yellow(), reason);
            }
        }
    }

    Ok(())
}
