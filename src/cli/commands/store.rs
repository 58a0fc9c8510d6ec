//! Store command - persist a generated model

use super::CommandContext;
use crate::cli::args::StoreArgs;
use crate::error::CacheResult;
use crate::model::ApiModel;
use console::style;
use tracing::debug;

/// Execute the store command
pub fn execute(args: StoreArgs, ctx: &CommandContext) -> CacheResult<()> {
    if !ctx.config.cache.enabled {
        println!(
            "{} Caching is disabled ([cache] enabled = false), nothing stored",
            style("!").yellow()
        );
        return Ok(());
    }

    let model = ApiModel::from_file(&args.model)?;
    debug!(
        "Loaded model {} {} with {} path(s)",
        model.title,
        model.version,
        model.paths.len()
    );

    let mut entry = ctx.current_entry(&args.identity, &args.files)?;
    entry.set_artifact(model)?;

    if entry.try_write()? {
        println!(
            "{} Stored {} ({} dependent file(s))",
            style("✓").green(),
            style(&args.identity).cyan(),
            entry.fingerprints().len()
        );
    } else {
        println!(
            "{} Skipped {}: nothing to cache",
            style("!").yellow(),
            style(&args.identity).cyan()
        );
    }

    Ok(())
}
