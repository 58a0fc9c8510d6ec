//! Show command - inspect a stored entry

use crate::cache::{CacheEntry, CacheStore};
use crate::cli::args::{OutputFormat, ShowArgs};
use crate::error::{CacheError, CacheResult};
use crate::model::ApiModel;
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::CommandContext;

#[derive(Serialize)]
struct FileJson<'a> {
    path: &'a str,
    size: u64,
    modified_ms: i64,
}

#[derive(Serialize)]
struct EntryJson<'a> {
    identity: &'a str,
    directory: String,
    title: &'a str,
    version: &'a str,
    model_digest: String,
    files: Vec<FileJson<'a>>,
    config: BTreeMap<&'a str, &'a str>,
}

/// SHA256 of the stored model, first 12 hex chars
fn short_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..6])
}

/// Load an entry and digest the model bytes it was decoded from
fn load(identity: &str, ctx: &CommandContext) -> CacheResult<(CacheEntry<ApiModel>, String)> {
    let raw = CacheStore::new(&ctx.cache_dir)
        .read(identity)?
        .ok_or_else(|| CacheError::User(format!("No cache entry for {identity}")))?;
    let entry = CacheEntry::from_stored(identity, &ctx.cache_dir, &raw)?;
    Ok((entry, short_digest(&raw.model)))
}

/// Execute the show command
pub fn execute(args: ShowArgs, ctx: &CommandContext) -> CacheResult<()> {
    let (entry, digest) = load(&args.identity, ctx)?;
    let dir = entry.cache_dir()?;

    let Some(model) = entry.artifact() else {
        return Err(CacheError::corrupt(&dir, "no model"));
    };
    let snapshot = entry.stored_snapshot().cloned().unwrap_or_default();

    match args.format {
        OutputFormat::Json => {
            let json = EntryJson {
                identity: entry.identity(),
                directory: dir.display().to_string(),
                title: &model.title,
                version: &model.version,
                model_digest: digest,
                files: entry
                    .fingerprints()
                    .entries()
                    .iter()
                    .map(|f| FileJson {
                        path: &f.path,
                        size: f.size,
                        modified_ms: f.modified_ms,
                    })
                    .collect(),
                config: snapshot.iter().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => {
            for file in entry.fingerprints().entries() {
                println!("{}", file.path);
            }
        }
        OutputFormat::Table => {
            println!("Identity: {}", style(entry.identity()).cyan());
            println!("Directory: {}", dir.display());
            println!(
                "Model: {} {} (sha256: {})",
                model.title, model.version, digest
            );
            println!();

            println!("{:<20} {:>10}  PATH", "MODIFIED", "SIZE");
            println!("{}", "-".repeat(80));
            for file in entry.fingerprints().entries() {
                let modified = DateTime::<Utc>::from_timestamp_millis(file.modified_ms)
                    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| file.modified_ms.to_string());
                println!("{:<20} {:>10}  {}", modified, file.size, file.path);
            }
            println!();

            if snapshot.is_empty() {
                println!("Config: {}", style("(none)").dim());
            } else {
                println!("Config:");
                for (key, value) in snapshot.iter() {
                    println!("  {} = {}", style(key).bold(), value);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Artifact;

    #[test]
    fn digest_is_short_and_stable() {
        let a = short_digest(b"{}");
        assert_eq!(a.len(), 12);
        assert_eq!(a, short_digest(b"{}"));
        assert_ne!(a, short_digest(b"[]"));
    }

    #[test]
    fn digest_matches_decoded_model() {
        let dir = tempfile::TempDir::new().unwrap();
        let jar = dir.path().join("a.jar");
        std::fs::write(&jar, "jar").unwrap();
        let ctx = CommandContext::new(Default::default(), dir.path().join("base"));

        let mut entry = ctx.current_entry("app1", &[jar]).unwrap();
        entry.set_artifact(ApiModel::new("Pets", "1.0")).unwrap();
        assert!(entry.try_write().unwrap());

        let (loaded, digest) = load("app1", &ctx).unwrap();
        let model = loaded.artifact().unwrap();
        assert_eq!(model.title, "Pets");
        assert_eq!(digest, short_digest(&model.encode().unwrap()));
    }

    #[test]
    fn show_missing_entry_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = CommandContext::new(Default::default(), dir.path().to_path_buf());
        let args = ShowArgs {
            identity: "nope".to_string(),
            format: OutputFormat::Table,
        };
        assert!(matches!(execute(args, &ctx), Err(CacheError::User(_))));
    }
}
