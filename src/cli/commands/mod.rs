//! CLI command implementations

pub mod clear;
pub mod list;
pub mod show;
pub mod status;
pub mod store;

pub use clear::execute as clear;
pub use list::execute as list;
pub use show::execute as show;
pub use status::execute as status;
pub use store::execute as store;

use crate::cache::CacheEntry;
use crate::config::Config;
use crate::error::CacheResult;
use crate::model::ApiModel;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolved settings shared by all commands
pub struct CommandContext {
    /// Merged configuration
    pub config: Arc<Config>,
    /// Cache base directory
    pub cache_dir: PathBuf,
}

impl CommandContext {
    pub fn new(config: Config, cache_dir: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            cache_dir,
        }
    }

    /// Build a write-path entry from the current config and dependent files
    fn current_entry(&self, identity: &str, files: &[PathBuf]) -> CacheResult<CacheEntry<ApiModel>> {
        let mut entry = CacheEntry::create_new(identity, &self.cache_dir);
        for file in files {
            entry.add_dependent_file(file)?;
        }
        entry.set_config(self.config.clone())?;
        Ok(entry)
    }
}
