//! Configuration schema for modelcache
//!
//! Configuration is stored at `~/.config/modelcache/config.toml`, with an
//! optional project-local `.modelcache.toml` layered on top.

use crate::config::source::ConfigSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target OpenAPI document settings
    pub openapi: OpenApiConfig,

    /// Document info block
    pub info: InfoConfig,

    /// Annotation scanning settings
    pub scan: ScanConfig,

    /// Generator behaviour
    pub generator: GeneratorConfig,

    /// Path- and operation-scoped server overrides
    pub overrides: OverridesConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// OpenAPI document settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    /// Document version to emit (e.g. "3.1.0")
    pub version: Option<String>,
}

/// Info block of the generated document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_url: Option<String>,
    pub license_name: Option<String>,
    pub license_url: Option<String>,
}

/// Annotation scanning settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Skip scanning entirely (static files only)
    pub disable: Option<bool>,

    /// Packages to include
    pub packages: Vec<String>,

    /// Classes to include
    pub classes: Vec<String>,

    /// Packages to exclude
    pub exclude_packages: Vec<String>,

    /// Classes to exclude
    pub exclude_classes: Vec<String>,

    /// Scan library dependencies as well
    pub dependencies: Option<bool>,

    /// Derive schema constraints from validation annotations
    pub bean_validation: Option<bool>,
}

/// Generator behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Global server URLs
    pub servers: Vec<String>,

    /// Strategy for synthesizing missing operation ids (METHOD, CLASS_METHOD, ...)
    pub operation_id_strategy: Option<String>,

    /// Emit schema properties in sorted order
    pub sorted_properties: Option<bool>,

    /// Include private methods when scanning
    pub private_methods: Option<bool>,

    /// Fully qualified custom schema registry
    pub schema_registry_class: Option<String>,
}

/// Server overrides keyed by path or operation id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverridesConfig {
    /// Path -> server URLs
    pub paths: BTreeMap<String, Vec<String>>,

    /// Operation id -> server URLs
    pub operations: BTreeMap<String, Vec<String>>,
}

/// Cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable model caching (default: true)
    pub enabled: bool,

    /// Base directory for cache entries (default: platform cache dir)
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values.iter().cloned().collect()
}

impl ConfigSource for Config {
    fn openapi_version(&self) -> Option<String> {
        self.openapi.version.clone()
    }

    fn info_title(&self) -> Option<String> {
        self.info.title.clone()
    }

    fn info_version(&self) -> Option<String> {
        self.info.version.clone()
    }

    fn info_description(&self) -> Option<String> {
        self.info.description.clone()
    }

    fn info_terms_of_service(&self) -> Option<String> {
        self.info.terms_of_service.clone()
    }

    fn info_contact_name(&self) -> Option<String> {
        self.info.contact_name.clone()
    }

    fn info_contact_email(&self) -> Option<String> {
        self.info.contact_email.clone()
    }

    fn info_contact_url(&self) -> Option<String> {
        self.info.contact_url.clone()
    }

    fn info_license_name(&self) -> Option<String> {
        self.info.license_name.clone()
    }

    fn info_license_url(&self) -> Option<String> {
        self.info.license_url.clone()
    }

    fn servers(&self) -> BTreeSet<String> {
        to_set(&self.generator.servers)
    }

    fn scan_disable(&self) -> Option<bool> {
        self.scan.disable
    }

    fn scan_packages(&self) -> BTreeSet<String> {
        to_set(&self.scan.packages)
    }

    fn scan_classes(&self) -> BTreeSet<String> {
        to_set(&self.scan.classes)
    }

    fn scan_exclude_packages(&self) -> BTreeSet<String> {
        to_set(&self.scan.exclude_packages)
    }

    fn scan_exclude_classes(&self) -> BTreeSet<String> {
        to_set(&self.scan.exclude_classes)
    }

    fn scan_dependencies(&self) -> Option<bool> {
        self.scan.dependencies
    }

    fn scan_bean_validation(&self) -> Option<bool> {
        self.scan.bean_validation
    }

    fn operation_id_strategy(&self) -> Option<String> {
        self.generator.operation_id_strategy.clone()
    }

    fn sorted_properties(&self) -> Option<bool> {
        self.generator.sorted_properties
    }

    fn private_methods(&self) -> Option<bool> {
        self.generator.private_methods
    }

    fn schema_registry_class(&self) -> Option<String> {
        self.generator.schema_registry_class.clone()
    }

    fn path_servers(&self, path: &str) -> BTreeSet<String> {
        self.overrides
            .paths
            .get(path)
            .map(|servers| to_set(servers))
            .unwrap_or_default()
    }

    fn operation_servers(&self, operation_id: &str) -> BTreeSet<String> {
        self.overrides
            .operations
            .get(operation_id)
            .map(|servers| to_set(servers))
            .unwrap_or_default()
    }
}
