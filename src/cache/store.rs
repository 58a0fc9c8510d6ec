//! Directory-backed persistence for cache entries
//!
//! Layout under the base directory:
//!
//! ```text
//! <base>/cache/<url-encoded-identity>/files
//! <base>/cache/<url-encoded-identity>/config
//! <base>/cache/<url-encoded-identity>/model
//! <base>/cache/.locks/<key>.lock
//! ```
//!
//! Encoded identities never start with `.`, so dot-prefixed names in the
//! cache root are reserved for locks and in-flight directories. Those
//! auxiliary names use a fixed-length key derived from the encoded
//! identity, so any entry name that fits the filesystem can be written.
//!
//! Writes are staged in a temporary sibling directory and renamed into
//! place while holding an exclusive advisory lock for the identity. Readers
//! take no lock: they observe the previous entry, the new one, or nothing.

use crate::error::{CacheError, CacheResult};
use chrono::Utc;
use fs4::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subdirectory of the base dir holding all entries
pub const CACHE_SUBDIR: &str = "cache";

/// Fingerprint list, one per line
pub const FILES_FILE: &str = "files";

/// Config snapshot, `key=value` lines
pub const CONFIG_FILE: &str = "config";

/// Serialized artifact
pub const MODEL_FILE: &str = "model";

const LOCKS_DIR: &str = ".locks";

/// Raw contents of the three files making up an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub files: String,
    pub config: String,
    pub model: Vec<u8>,
}

/// Directory store rooted at `<base>/cache`
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store for the given base directory
    pub fn new(base_dir: &Path) -> Self {
        Self {
            root: base_dir.join(CACHE_SUBDIR),
        }
    }

    /// Directory holding all entries
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Encode an identity into a safe directory name
    pub fn encode_identity(identity: &str) -> CacheResult<String> {
        if identity.is_empty() {
            return Err(CacheError::InvalidIdentity(identity.to_string()));
        }

        let encoded = urlencoding::encode(identity);
        // Keeps "." and ".." out and leaves dot-names free for internal use
        Ok(match encoded.strip_prefix('.') {
            Some(rest) => format!("%2E{rest}"),
            None => encoded.into_owned(),
        })
    }

    /// Recover an identity from a directory name
    pub fn decode_identity(name: &str) -> Option<String> {
        if name.starts_with('.') {
            return None;
        }
        urlencoding::decode(name).ok().map(|s| s.into_owned())
    }

    /// Fixed-length name for the lock, staging and retired paths of an entry
    fn aux_key(encoded: &str) -> String {
        let digest = Sha256::digest(encoded.as_bytes());
        hex::encode(&digest[..8])
    }

    /// Directory for one identity
    pub fn entry_dir(&self, identity: &str) -> CacheResult<PathBuf> {
        Ok(self.root.join(Self::encode_identity(identity)?))
    }

    /// Replace the entry for `identity` with `entry`
    ///
    /// Fails with [`CacheError::NotADirectory`] if something other than a
    /// directory occupies the entry path.
    pub fn write(&self, identity: &str, entry: &StoredEntry) -> CacheResult<PathBuf> {
        let encoded = Self::encode_identity(identity)?;
        let key = Self::aux_key(&encoded);
        let target = self.root.join(&encoded);

        ensure_dir(&self.root)?;
        let _lock = self.lock(&key)?;

        if target.exists() && !target.is_dir() {
            return Err(CacheError::NotADirectory(target));
        }

        let staging = tempfile::Builder::new()
            .prefix(&format!(".tmp-{key}-"))
            .tempdir_in(&self.root)
            .map_err(|e| CacheError::io(format!("creating staging dir in {}", self.root.display()), e))?;

        write_file(&staging.path().join(FILES_FILE), entry.files.as_bytes())?;
        write_file(&staging.path().join(CONFIG_FILE), entry.config.as_bytes())?;
        write_file(&staging.path().join(MODEL_FILE), &entry.model)?;

        let retired = if target.exists() {
            let aside = self.root.join(format!(
                ".old-{key}-{}-{}",
                std::process::id(),
                Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ));
            fs::rename(&target, &aside)
                .map_err(|e| CacheError::io(format!("moving aside {}", target.display()), e))?;
            Some(aside)
        } else {
            None
        };

        if let Err(e) = fs::rename(staging.path(), &target) {
            if let Some(aside) = &retired {
                // Put the previous entry back; a miss is fine if this fails too
                let _ = fs::rename(aside, &target);
            }
            return Err(CacheError::io(
                format!("moving staged entry into {}", target.display()),
                e,
            ));
        }

        if let Some(aside) = retired {
            if let Err(e) = remove_dir_recursive(&aside) {
                warn!("Failed to remove retired cache dir: {}", e);
            }
        }

        debug!("Wrote cache entry {}", target.display());
        Ok(target)
    }

    /// Read the entry for `identity`
    ///
    /// `Ok(None)` when nothing is stored. An entry path that is not a
    /// directory, or a directory missing one of its files, is an error.
    pub fn read(&self, identity: &str) -> CacheResult<Option<StoredEntry>> {
        let dir = self.entry_dir(identity)?;

        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(CacheError::NotADirectory(dir)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(format!("inspecting {}", dir.display()), e)),
        }

        let files = read_component(&dir, FILES_FILE)?;
        let config = read_component(&dir, CONFIG_FILE)?;
        let model = read_component(&dir, MODEL_FILE)?;

        let files = String::from_utf8(files)
            .map_err(|_| CacheError::corrupt(dir.join(FILES_FILE), "not valid UTF-8"))?;
        let config = String::from_utf8(config)
            .map_err(|_| CacheError::corrupt(dir.join(CONFIG_FILE), "not valid UTF-8"))?;

        Ok(Some(StoredEntry {
            files,
            config,
            model,
        }))
    }

    /// Remove the entry for `identity` and its lock file; returns whether
    /// anything was removed
    pub fn remove(&self, identity: &str) -> CacheResult<bool> {
        let encoded = Self::encode_identity(identity)?;
        let key = Self::aux_key(&encoded);
        let target = self.root.join(&encoded);

        if !target.exists() {
            return Ok(false);
        }

        let lock = self.lock(&key)?;
        if target.is_dir() {
            remove_dir_recursive(&target)?;
        } else {
            fs::remove_file(&target)
                .map_err(|e| CacheError::io(format!("removing {}", target.display()), e))?;
        }
        drop(lock);

        let lock_path = self.lock_path(&key);
        if let Err(e) = fs::remove_file(&lock_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove lock file {}: {}", lock_path.display(), e);
            }
        }
        Ok(true)
    }

    /// Remove every entry, including locks and leftovers from interrupted writes
    pub fn clear(&self) -> CacheResult<usize> {
        let count = self.list()?.len();
        if self.root.exists() {
            remove_dir_recursive(&self.root)?;
        }
        Ok(count)
    }

    /// Identities with an entry directory, sorted
    pub fn list(&self) -> CacheResult<Vec<String>> {
        let reader = match fs::read_dir(&self.root) {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(format!("listing {}", self.root.display()), e)),
        };

        let mut identities = Vec::new();
        for dirent in reader {
            let dirent =
                dirent.map_err(|e| CacheError::io(format!("listing {}", self.root.display()), e))?;
            if !dirent.path().is_dir() {
                continue;
            }
            if let Some(identity) = dirent.file_name().to_str().and_then(Self::decode_identity) {
                identities.push(identity);
            }
        }

        identities.sort();
        Ok(identities)
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.root.join(LOCKS_DIR).join(format!("{key}.lock"))
    }

    /// Take the per-identity advisory lock; released when the file is dropped
    fn lock(&self, key: &str) -> CacheResult<File> {
        ensure_dir(&self.root.join(LOCKS_DIR))?;

        let path = self.lock_path(key);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| CacheError::Lock {
                path: path.clone(),
                source: e,
            })?;
        file.lock_exclusive()
            .map_err(|e| CacheError::Lock { path, source: e })?;
        Ok(file)
    }
}

/// Create a directory and its parents
pub fn ensure_dir(path: &Path) -> CacheResult<()> {
    fs::create_dir_all(path)
        .map_err(|e| CacheError::io(format!("creating directory {}", path.display()), e))
}

/// Delete a directory tree; a missing directory is not an error
pub fn remove_dir_recursive(path: &Path) -> CacheResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::io(format!("removing {}", path.display()), e)),
    }
}

fn write_file(path: &Path, contents: &[u8]) -> CacheResult<()> {
    fs::write(path, contents).map_err(|e| CacheError::io(format!("writing {}", path.display()), e))
}

fn read_component(dir: &Path, name: &str) -> CacheResult<Vec<u8>> {
    let path = dir.join(name);
    fs::read(&path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            CacheError::corrupt(dir, format!("missing {name}"))
        } else {
            CacheError::io(format!("reading {}", path.display()), e)
        }
    })
}
