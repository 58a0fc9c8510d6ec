//! Config snapshot derivation
//!
//! A snapshot flattens everything in the configuration that can change the
//! generated model into one `key -> value` map. It has two sources:
//!
//! 1. [`CONFIG_FIELDS`], a fixed table of named extractors applied to the
//!    config object.
//! 2. Override sets scoped to identifiers found in an artifact
//!    (`pathOverride.<path>`, `operationOverride.<operationId>`). These keys
//!    cannot be enumerated from the config alone, so a snapshot is always
//!    derived against a concrete artifact.
//!
//! Absent values are omitted rather than stored empty, so "unset" and
//! "set to something else" both show up as a difference.

use crate::cache::artifact::Artifact;
use crate::config::ConfigSource;
use std::collections::{BTreeMap, BTreeSet};

/// Key prefix for path-scoped overrides
pub const PATH_OVERRIDE_PREFIX: &str = "pathOverride.";

/// Key prefix for operation-scoped overrides
pub const OPERATION_OVERRIDE_PREFIX: &str = "operationOverride.";

/// A named extractor in the fixed snapshot table
#[derive(Clone, Copy)]
pub struct ConfigField {
    /// Snapshot key
    pub key: &'static str,
    /// Reads the value from a config; `None` means "omit"
    pub extract: fn(&dyn ConfigSource) -> Option<String>,
}

impl std::fmt::Debug for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigField").field("key", &self.key).finish()
    }
}

fn flag(value: Option<bool>) -> Option<String> {
    value.map(|b| b.to_string())
}

/// Sorted, comma-joined; an empty set counts as absent
fn joined(values: BTreeSet<String>) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.into_iter().collect::<Vec<_>>().join(","))
    }
}

/// Fixed extractor table, applied in order
pub const CONFIG_FIELDS: &[ConfigField] = &[
    ConfigField { key: "openapiVersion", extract: |c| c.openapi_version() },
    ConfigField { key: "info.title", extract: |c| c.info_title() },
    ConfigField { key: "info.version", extract: |c| c.info_version() },
    ConfigField { key: "info.description", extract: |c| c.info_description() },
    ConfigField { key: "info.termsOfService", extract: |c| c.info_terms_of_service() },
    ConfigField { key: "info.contact.name", extract: |c| c.info_contact_name() },
    ConfigField { key: "info.contact.email", extract: |c| c.info_contact_email() },
    ConfigField { key: "info.contact.url", extract: |c| c.info_contact_url() },
    ConfigField { key: "info.license.name", extract: |c| c.info_license_name() },
    ConfigField { key: "info.license.url", extract: |c| c.info_license_url() },
    ConfigField { key: "servers", extract: |c| joined(c.servers()) },
    ConfigField { key: "scan.disable", extract: |c| flag(c.scan_disable()) },
    ConfigField { key: "scan.packages", extract: |c| joined(c.scan_packages()) },
    ConfigField { key: "scan.classes", extract: |c| joined(c.scan_classes()) },
    ConfigField { key: "scan.excludePackages", extract: |c| joined(c.scan_exclude_packages()) },
    ConfigField { key: "scan.excludeClasses", extract: |c| joined(c.scan_exclude_classes()) },
    ConfigField { key: "scan.dependencies", extract: |c| flag(c.scan_dependencies()) },
    ConfigField { key: "scan.beanValidation", extract: |c| flag(c.scan_bean_validation()) },
    ConfigField { key: "operationIdStrategy", extract: |c| c.operation_id_strategy() },
    ConfigField { key: "sortedProperties", extract: |c| flag(c.sorted_properties()) },
    ConfigField { key: "privateMethods", extract: |c| flag(c.private_methods()) },
    ConfigField { key: "schemaRegistryClass", extract: |c| c.schema_registry_class() },
];

/// Flattened, comparable view of the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    values: BTreeMap<String, String>,
}

impl ConfigSnapshot {
    /// Derive a snapshot from `config`, probing override scopes found in `artifact`
    ///
    /// Without an artifact only the fixed table contributes.
    pub fn derive<A: Artifact>(config: &dyn ConfigSource, artifact: Option<&A>) -> Self {
        let mut values = BTreeMap::new();

        for field in CONFIG_FIELDS {
            if let Some(value) = (field.extract)(config) {
                values.insert(field.key.to_string(), value);
            }
        }

        if let Some(artifact) = artifact {
            for path in artifact.path_ids() {
                if let Some(servers) = joined(config.path_servers(&path)) {
                    values.insert(format!("{PATH_OVERRIDE_PREFIX}{path}"), servers);
                }
            }
            for operation_id in artifact.operation_ids() {
                if let Some(servers) = joined(config.operation_servers(&operation_id)) {
                    values.insert(format!("{OPERATION_OVERRIDE_PREFIX}{operation_id}"), servers);
                }
            }
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys that are added, removed or changed between `self` and `other`, sorted
    pub fn changed_keys(&self, other: &Self) -> Vec<String> {
        let keys: BTreeSet<&String> = self.values.keys().chain(other.values.keys()).collect();
        keys.into_iter()
            .filter(|key| self.values.get(*key) != other.values.get(*key))
            .cloned()
            .collect()
    }

    /// Render as the `config` document: sorted `key=value` lines
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.values {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }

    /// Parse the `config` document; blank lines are ignored
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut values = BTreeMap::new();
        for line in text.lines().filter(|line| !line.is_empty()) {
            let (key, value) =
                split_line(line).ok_or_else(|| format!("missing '=' in {line:?}"))?;
            values.insert(key, value);
        }
        Ok(Self { values })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '=' if is_key => out.push_str("\\="),
            other => out.push(other),
        }
    }
    out
}

/// Split on the first unescaped `=` and unescape both halves
fn split_line(line: &str) -> Option<(String, String)> {
    let mut key = String::new();
    let mut chars = line.chars();

    loop {
        match chars.next()? {
            '=' => break,
            '\\' => key.push(unescape_char(chars.next()?)),
            other => key.push(other),
        }
    }

    let mut value = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => value.push(unescape_char(chars.next()?)),
            other => value.push(other),
        }
    }

    Some((key, value))
}

fn unescape_char(ch: char) -> char {
    match ch {
        'n' => '\n',
        'r' => '\r',
        other => other,
    }
}
