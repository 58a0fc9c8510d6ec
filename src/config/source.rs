//! Named accessors over generator configuration
//!
//! The cache never reads a config file itself. It consumes any type that
//! exposes these accessors, so embedding applications can back them with
//! their own settings system.

use std::collections::BTreeSet;

/// Read-only view of the settings that influence model generation
///
/// Every accessor defaults to "not configured" so implementors only
/// override what they actually support.
pub trait ConfigSource {
    /// OpenAPI version the generated document targets
    fn openapi_version(&self) -> Option<String> {
        None
    }

    fn info_title(&self) -> Option<String> {
        None
    }

    fn info_version(&self) -> Option<String> {
        None
    }

    fn info_description(&self) -> Option<String> {
        None
    }

    fn info_terms_of_service(&self) -> Option<String> {
        None
    }

    fn info_contact_name(&self) -> Option<String> {
        None
    }

    fn info_contact_email(&self) -> Option<String> {
        None
    }

    fn info_contact_url(&self) -> Option<String> {
        None
    }

    fn info_license_name(&self) -> Option<String> {
        None
    }

    fn info_license_url(&self) -> Option<String> {
        None
    }

    /// Global server URLs
    fn servers(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn scan_disable(&self) -> Option<bool> {
        None
    }

    fn scan_packages(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn scan_classes(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn scan_exclude_packages(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn scan_exclude_classes(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn scan_dependencies(&self) -> Option<bool> {
        None
    }

    fn scan_bean_validation(&self) -> Option<bool> {
        None
    }

    fn operation_id_strategy(&self) -> Option<String> {
        None
    }

    fn sorted_properties(&self) -> Option<bool> {
        None
    }

    fn private_methods(&self) -> Option<bool> {
        None
    }

    fn schema_registry_class(&self) -> Option<String> {
        None
    }

    /// Server URLs overriding the global list for one path
    fn path_servers(&self, _path: &str) -> BTreeSet<String> {
        BTreeSet::new()
    }

    /// Server URLs overriding the global list for one operation
    fn operation_servers(&self, _operation_id: &str) -> BTreeSet<String> {
        BTreeSet::new()
    }
}
