//! Generated API model
//!
//! A minimal document model (paths -> methods -> operations) used as the
//! cached artifact by the CLI. Stored as JSON in the `model` file.

use crate::cache::Artifact;
use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Generated API document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiModel {
    /// Document format version
    #[serde(default = "default_openapi")]
    pub openapi: String,

    /// API title
    pub title: String,

    /// API version
    pub version: String,

    /// Route path -> operations
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

fn default_openapi() -> String {
    "3.1.0".to_string()
}

/// Operations available on one path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    /// HTTP method (lowercase) -> operation
    #[serde(flatten)]
    pub operations: BTreeMap<String, Operation>,
}

/// A single operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Operation {
    pub fn with_id(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
            summary: None,
        }
    }
}

impl ApiModel {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: default_openapi(),
            title: title.into(),
            version: version.into(),
            paths: BTreeMap::new(),
        }
    }

    /// Add an operation under `path`, replacing any with the same method
    pub fn add_operation(&mut self, path: &str, method: &str, operation: Operation) {
        self.paths
            .entry(path.to_string())
            .or_default()
            .operations
            .insert(method.to_ascii_lowercase(), operation);
    }

    /// Load a model from a JSON file
    pub fn from_file(path: &Path) -> CacheResult<Self> {
        let content = fs::read(path)
            .map_err(|e| CacheError::io(format!("reading model from {}", path.display()), e))?;

        serde_json::from_slice(&content).map_err(|e| CacheError::ModelInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Artifact for ApiModel {
    fn path_ids(&self) -> Vec<String> {
        self.paths.keys().cloned().collect()
    }

    fn operation_ids(&self) -> Vec<String> {
        self.paths
            .values()
            .flat_map(|item| item.operations.values())
            .filter_map(|op| op.operation_id.clone())
            .collect()
    }

    fn encode(&self) -> CacheResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn decode(bytes: &[u8]) -> CacheResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
