//! Error types for modelcache
//!
//! All modules use `CacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in modelcache
#[derive(Error, Debug)]
pub enum CacheError {
    // Filesystem errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to lock cache entry {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Contract errors
    #[error("Invalid cache entry state: {0}")]
    InvalidState(String),

    #[error("Invalid cache identity: {0:?}")]
    InvalidIdentity(String),

    // Content errors
    #[error("Corrupt cache entry at {path}: {reason}")]
    CorruptEntry { path: PathBuf, reason: String },

    #[error("Invalid model at {path}: {reason}")]
    ModelInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a corrupt entry error
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptEntry {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error comes from the environment (disk, locks) rather
    /// than from API misuse or bad input
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::NotADirectory(_) | Self::Lock { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotADirectory(_) => {
                Some("Remove the file blocking the cache path, or run: modelcache clear --all")
            }
            Self::CorruptEntry { .. } => Some("Run: modelcache clear <identity>"),
            Self::Lock { .. } => Some("Another process may be writing this entry; retry shortly"),
            Self::ConfigInvalid { .. } => Some("Fix the TOML file, or pass --no-local to skip .modelcache.toml"),
            _ => None,
        }
    }
}
