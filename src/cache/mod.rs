//! Persistent cache for derived artifacts
//!
//! An entry stores one artifact per identity together with everything that
//! can invalidate it: an ordered list of dependent-file fingerprints and a
//! snapshot of the configuration that shaped generation. On the next run a
//! fresh entry built from current inputs is compared against the stored
//! one; the artifact is reused only if nothing changed.
//!
//! # On-disk Layout
//!
//! | File | Contents |
//! |------|----------|
//! | `<base>/cache/<identity>/files` | `<mtime-ms> <size> <path>` per line, in insertion order |
//! | `<base>/cache/<identity>/config` | `key=value` per line, sorted by key |
//! | `<base>/cache/<identity>/model` | artifact, in the artifact's own encoding |
//!
//! There is no format version marker; a format change needs a full clear.
//!
//! # Failure Model
//!
//! Caching is an optimization. [`CacheEntry::read`] and [`CacheEntry::write`]
//! never fail: unreadable entries are misses, failed writes are logged.
//! Misuse, such as comparing against an entry that was never loaded, is an
//! error.

pub mod artifact;
pub mod entry;
pub mod fingerprint;
pub mod snapshot;
pub mod store;

pub use artifact::Artifact;
pub use entry::CacheEntry;
pub use fingerprint::{FingerprintEntry, FingerprintSet};
pub use snapshot::{ConfigField, ConfigSnapshot, CONFIG_FIELDS};
pub use store::{CacheStore, StoredEntry};
