//! Cache entry orchestration
//!
//! A [`CacheEntry`] has two lifecycles:
//!
//! - **write path**: [`CacheEntry::create_new`], populated with dependent
//!   files, a config and an artifact, then [`CacheEntry::write`]n or dropped.
//! - **read path**: [`CacheEntry::read`] from disk, used as the
//!   authoritative side of [`CacheEntry::is_up_to_date_with`], then dropped.
//!   Loaded entries are read-only; the setters return
//!   [`CacheError::InvalidState`].
//!
//! The config snapshot of a write-path entry is derived lazily. Dynamic
//! override keys depend on the identifiers present in an artifact, and the
//! artifact may be set after the config, so the snapshot is finalized only
//! when it is needed: against the entry's own artifact when writing, and
//! against the stored artifact when comparing.

use crate::cache::artifact::Artifact;
use crate::cache::fingerprint::FingerprintSet;
use crate::cache::snapshot::ConfigSnapshot;
use crate::cache::store::{CacheStore, StoredEntry};
use crate::config::ConfigSource;
use crate::error::{CacheError, CacheResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Built in memory for the current run
    Fresh,
    /// Loaded from disk; carries a materialized snapshot
    Loaded,
}

/// Identity, artifact, config snapshot and dependent-file fingerprints
pub struct CacheEntry<A> {
    identity: String,
    store: CacheStore,
    artifact: Option<A>,
    config: Option<Arc<dyn ConfigSource>>,
    snapshot: Option<ConfigSnapshot>,
    fingerprints: FingerprintSet,
    origin: Origin,
}

impl<A: Artifact> CacheEntry<A> {
    /// Start an empty write-path entry
    pub fn create_new(identity: impl Into<String>, base_dir: &Path) -> Self {
        Self {
            identity: identity.into(),
            store: CacheStore::new(base_dir),
            artifact: None,
            config: None,
            snapshot: None,
            fingerprints: FingerprintSet::new(),
            origin: Origin::Fresh,
        }
    }

    /// Entries loaded from disk are read-only
    fn ensure_mutable(&self, operation: &str) -> CacheResult<()> {
        match self.origin {
            Origin::Fresh => Ok(()),
            Origin::Loaded => Err(CacheError::InvalidState(format!(
                "cannot {operation} on entry {:?} loaded from disk",
                self.identity
            ))),
        }
    }

    /// Record a file the artifact was derived from
    pub fn add_dependent_file(&mut self, path: &Path) -> CacheResult<()> {
        self.ensure_mutable("add a dependent file")?;
        self.fingerprints.add(path)
    }

    /// Attach the config; the snapshot is derived later, see module docs
    pub fn set_config(&mut self, config: Arc<dyn ConfigSource>) -> CacheResult<()> {
        self.ensure_mutable("set the config")?;
        self.config = Some(config);
        Ok(())
    }

    /// Attach the value to cache
    pub fn set_artifact(&mut self, artifact: A) -> CacheResult<()> {
        self.ensure_mutable("set the artifact")?;
        self.artifact = Some(artifact);
        Ok(())
    }

    pub fn artifact(&self) -> Option<&A> {
        self.artifact.as_ref()
    }

    pub fn into_artifact(self) -> Option<A> {
        self.artifact
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn fingerprints(&self) -> &FingerprintSet {
        &self.fingerprints
    }

    /// Snapshot read from disk; `None` for write-path entries
    pub fn stored_snapshot(&self) -> Option<&ConfigSnapshot> {
        self.snapshot.as_ref()
    }

    /// Whether this entry came from [`CacheEntry::read`]
    pub fn is_loaded(&self) -> bool {
        self.origin == Origin::Loaded
    }

    /// Directory this entry is persisted in
    pub fn cache_dir(&self) -> CacheResult<PathBuf> {
        self.store.entry_dir(&self.identity)
    }

    /// Finalize the config snapshot, probing overrides scoped to `reference`
    ///
    /// Uses the attached config when there is one, otherwise the stored
    /// snapshot. `None` when the entry has neither.
    pub fn finalize_snapshot(&self, reference: Option<&A>) -> Option<ConfigSnapshot> {
        match (&self.config, &self.snapshot) {
            (Some(config), _) => Some(ConfigSnapshot::derive(config.as_ref(), reference)),
            (None, Some(stored)) => Some(stored.clone()),
            (None, None) => None,
        }
    }

    /// Decide whether `current` can reuse this stored entry
    ///
    /// Only valid on an entry loaded from disk. Checks, in order: identity,
    /// `current`'s config snapshot probed against this entry's stored
    /// artifact, then dependent-file fingerprints.
    pub fn is_up_to_date_with(&self, current: &CacheEntry<A>) -> CacheResult<bool> {
        let stored = match (&self.origin, &self.snapshot) {
            (Origin::Loaded, Some(stored)) => stored,
            _ => {
                return Err(CacheError::InvalidState(format!(
                    "entry {:?} was not loaded from disk and cannot be compared against",
                    self.identity
                )))
            }
        };

        if self.identity != current.identity {
            warn!(
                "Cache identity mismatch: stored {:?}, current {:?}",
                self.identity, current.identity
            );
            return Ok(false);
        }

        let Some(snapshot) = current.finalize_snapshot(self.artifact.as_ref()) else {
            debug!("No config attached to current entry {}", current.identity);
            return Ok(false);
        };
        if &snapshot != stored {
            debug!(
                "Config changed for {}: {}",
                self.identity,
                stored.changed_keys(&snapshot).join(", ")
            );
            return Ok(false);
        }

        if self.fingerprints != current.fingerprints {
            debug!("Dependent files changed for {}", self.identity);
            return Ok(false);
        }

        debug!("Cache entry {} is up to date", self.identity);
        Ok(true)
    }

    fn is_complete(&self) -> bool {
        !self.identity.is_empty()
            && self.artifact.is_some()
            && (self.config.is_some() || self.snapshot.is_some())
            && !self.fingerprints.is_empty()
    }

    /// Persist the entry, propagating failures
    ///
    /// Returns `Ok(false)` without touching disk if the entry is incomplete.
    pub fn try_write(&self) -> CacheResult<bool> {
        let artifact = match &self.artifact {
            Some(artifact) if self.is_complete() => artifact,
            _ => {
                debug!("Skipping cache write for {:?}: entry incomplete", self.identity);
                return Ok(false);
            }
        };

        let snapshot = self.finalize_snapshot(Some(artifact)).unwrap_or_default();
        let stored = StoredEntry {
            files: self.fingerprints.to_text(),
            config: snapshot.to_text(),
            model: artifact.encode()?,
        };

        let dir = self.store.write(&self.identity, &stored)?;
        info!("Cached {} in {}", self.identity, dir.display());
        Ok(true)
    }

    /// Persist the entry; failures are logged and swallowed
    pub fn write(&self) {
        if let Err(e) = self.try_write() {
            warn!("Failed to write cache entry {}: {}", self.identity, e);
        }
    }

    /// Load a stored entry, propagating failures
    pub fn try_read(identity: &str, base_dir: &Path) -> CacheResult<Option<Self>> {
        let store = CacheStore::new(base_dir);
        let Some(raw) = store.read(identity)? else {
            return Ok(None);
        };
        Self::from_stored(identity, base_dir, &raw).map(Some)
    }

    /// Decode raw contents already read through [`CacheStore::read`]
    pub fn from_stored(identity: &str, base_dir: &Path, raw: &StoredEntry) -> CacheResult<Self> {
        let store = CacheStore::new(base_dir);
        let dir = store.entry_dir(identity)?;

        let fingerprints =
            FingerprintSet::parse(&raw.files).map_err(|reason| CacheError::corrupt(&dir, reason))?;
        let snapshot =
            ConfigSnapshot::parse(&raw.config).map_err(|reason| CacheError::corrupt(&dir, reason))?;
        let artifact = A::decode(&raw.model).map_err(|e| CacheError::corrupt(&dir, e.to_string()))?;

        Ok(Self {
            identity: identity.to_string(),
            store,
            artifact: Some(artifact),
            config: None,
            snapshot: Some(snapshot),
            fingerprints,
            origin: Origin::Loaded,
        })
    }

    /// Load a stored entry; anything unreadable counts as a miss
    pub fn read(identity: &str, base_dir: &Path) -> Option<Self> {
        match Self::try_read(identity, base_dir) {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                debug!("No cache entry for {}", identity);
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", identity, e);
                None
            }
        }
    }
}
