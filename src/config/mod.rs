//! Configuration management for modelcache

pub mod schema;
pub mod source;

pub use schema::Config;
pub use source::ConfigSource;

use crate::error::{CacheError, CacheResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = ".modelcache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("modelcache")
            .join("config.toml")
    }

    /// Get the default cache base directory
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("modelcache")
    }

    /// Resolve the cache base directory: explicit override, then config, then default
    pub fn cache_dir(config: &Config, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| config.cache.dir.clone())
            .unwrap_or_else(Self::default_cache_dir)
    }

    /// Walk up from `start` looking for a project-local config file
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load the global config and layer a project-local file over it
    ///
    /// Tables are merged key by key; values from the local file win.
    pub fn load_merged(&self, local: Option<&Path>) -> CacheResult<Config> {
        let mut base = if self.config_path.exists() {
            Self::read_table(&self.config_path)?
        } else {
            debug!("Config file not found, using defaults");
            toml::Table::new()
        };

        if let Some(local) = local {
            debug!("Merging local config {}", local.display());
            merge_tables(&mut base, Self::read_table(local)?);
        }

        toml::Value::Table(base)
            .try_into()
            .map_err(|e: toml::de::Error| CacheError::ConfigInvalid {
                path: local.unwrap_or(&self.config_path).to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn read_table(path: &Path) -> CacheResult<toml::Table> {
        let content = fs::read_to_string(path)
            .map_err(|e| CacheError::io(format!("reading config from {}", path.display()), e))?;

        content
            .parse::<toml::Table>()
            .map_err(|e| CacheError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}
