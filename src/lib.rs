//! modelcache - persistent cache for generated API models
//!
//! Stores a generated model per identity and decides on later runs, without
//! regenerating, whether it is still valid for the current configuration
//! and dependent files.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;

pub use error::{CacheError, CacheResult};
