//! Dependent-file fingerprints
//!
//! A fingerprint is a cheap stand-in for file contents: path, size and
//! modification time. The set is ordered and compared position by
//! position, so the same files added in a different order do not match.

use crate::error::{CacheError, CacheResult};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Fingerprint of a single dependent file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FingerprintEntry {
    /// Path as supplied by the caller
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time, milliseconds since the Unix epoch
    pub modified_ms: i64,
}

impl FingerprintEntry {
    pub fn new(path: impl Into<String>, size: u64, modified_ms: i64) -> Self {
        Self {
            path: path.into(),
            size,
            modified_ms,
        }
    }

    /// Stat a file and capture its fingerprint
    ///
    /// The path must be valid UTF-8 without line breaks so it survives the
    /// `files` line format unchanged.
    pub fn from_file(path: &Path) -> CacheResult<Self> {
        let Some(display) = path.to_str() else {
            return Err(CacheError::io(
                format!("fingerprinting {}", path.display()),
                io::Error::new(io::ErrorKind::InvalidInput, "path is not valid UTF-8"),
            ));
        };
        if display.contains(['\n', '\r']) {
            return Err(CacheError::io(
                format!("fingerprinting {display:?}"),
                io::Error::new(io::ErrorKind::InvalidInput, "path contains a line break"),
            ));
        }
        let display = display.to_string();

        let meta = fs::metadata(path)
            .map_err(|e| CacheError::io(format!("reading metadata of {}", path.display()), e))?;
        let modified = meta
            .modified()
            .map_err(|e| CacheError::io(format!("reading mtime of {}", path.display()), e))?;

        Ok(Self {
            path: display,
            size: meta.len(),
            modified_ms: DateTime::<Utc>::from(modified).timestamp_millis(),
        })
    }
}

impl fmt::Display for FingerprintEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Path goes last so it may contain spaces
        write!(f, "{} {} {}", self.modified_ms, self.size, self.path)
    }
}

impl FromStr for FingerprintEntry {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.splitn(3, ' ');
        let modified_ms = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| format!("bad modification time in {line:?}"))?;
        let size = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| format!("bad size in {line:?}"))?;
        let path = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("missing path in {line:?}"))?;

        Ok(Self::new(path, size, modified_ms))
    }
}

/// Ordered list of dependent-file fingerprints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintSet {
    entries: Vec<FingerprintEntry>,
}

impl FingerprintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stat `path` and append its fingerprint
    pub fn add(&mut self, path: &Path) -> CacheResult<()> {
        let entry = FingerprintEntry::from_file(path)?;
        self.entries.push(entry);
        Ok(())
    }

    /// Append an already captured fingerprint
    pub fn push(&mut self, entry: FingerprintEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FingerprintEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as the `files` document: one fingerprint per line
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{entry}\n"))
            .collect()
    }

    /// Parse the `files` document; blank lines are ignored
    pub fn parse(text: &str) -> Result<Self, String> {
        let entries = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }
}

impl FromIterator<FingerprintEntry> for FingerprintSet {
    fn from_iter<I: IntoIterator<Item = FingerprintEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
