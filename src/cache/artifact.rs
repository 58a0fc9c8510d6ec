//! Contract between the cache and the values it stores
//!
//! The cache treats an artifact as an opaque blob for persistence, but it
//! needs to see the identifiers that config overrides can be scoped to.

use crate::error::CacheResult;

/// A derived value that can be cached
pub trait Artifact: Sized {
    /// Path-like identifiers present in the artifact (e.g. route paths)
    fn path_ids(&self) -> Vec<String>;

    /// Operation identifiers nested under the paths
    fn operation_ids(&self) -> Vec<String>;

    /// Serialize for the `model` file
    fn encode(&self) -> CacheResult<Vec<u8>>;

    /// Deserialize from the `model` file
    fn decode(bytes: &[u8]) -> CacheResult<Self>;
}
