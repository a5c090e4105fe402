//! The remote version catalog.
//!
//! The catalog maps each dependency name to the versions published for it in
//! two numbering spaces:
//! - manifest-linked modules map an `api` version (used in `manifest.json`)
//!   to the set of `npm` versions built against it
//! - data-only packages only carry a set of `npm` versions
//!
//! The catalog is read-only and fetched fresh for every invocation. Order in
//! the source documents carries no meaning; "latest" is always computed.

use semver::Version;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while obtaining a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog could not be fetched.
    #[error("catalog unavailable at '{url}': {reason}")]
    Unavailable { url: String, reason: String },

    /// A catalog document was fetched but is not in the expected shape.
    #[error("malformed catalog document '{document}': {reason}")]
    Malformed { document: String, reason: String },
}

/// Version table for manifest-linked modules: `name -> api -> [npm]`.
pub type ModuleVersions = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Version table for data-only packages: `name -> [npm]`.
pub type DataVersions = BTreeMap<String, Vec<String>>;

/// An immutable snapshot of the available dependency versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    modules: ModuleVersions,
    data: DataVersions,
}

impl VersionCatalog {
    /// Build a catalog from already-parsed tables.
    #[must_use]
    pub fn new(modules: ModuleVersions, data: DataVersions) -> Self {
        Self { modules, data }
    }

    /// Parse the two catalog documents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Malformed`] if either document is not valid JSON
    /// of the expected shape.
    pub fn from_json(modules: &str, data: &str) -> Result<Self, CatalogError> {
        let modules: ModuleVersions =
            serde_json::from_str(modules).map_err(|e| CatalogError::Malformed {
                document: "modules".to_string(),
                reason: e.to_string(),
            })?;
        let data: DataVersions =
            serde_json::from_str(data).map_err(|e| CatalogError::Malformed {
                document: "data".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(modules, data))
    }

    /// Returns true if the name is a manifest-linked module in this catalog.
    #[must_use]
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Returns true if the name is a data-only package in this catalog.
    #[must_use]
    pub fn has_data(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// All `api` versions of a module, newest first.
    #[must_use]
    pub fn api_versions(&self, name: &str) -> Option<Vec<&str>> {
        self.modules
            .get(name)
            .map(|apis| newest_first(apis.keys().map(String::as_str)))
    }

    /// All `npm` versions built against one `api` version, newest first.
    #[must_use]
    pub fn npm_versions(&self, name: &str, api: &str) -> Option<Vec<&str>> {
        self.modules
            .get(name)?
            .get(api)
            .map(|npms| newest_first(npms.iter().map(String::as_str)))
    }

    /// All `npm` versions of a data-only package, newest first.
    #[must_use]
    pub fn data_versions(&self, name: &str) -> Option<Vec<&str>> {
        self.data
            .get(name)
            .map(|npms| newest_first(npms.iter().map(String::as_str)))
    }

    /// Returns true if `api`/`npm` are jointly present for the module.
    #[must_use]
    pub fn contains_pair(&self, name: &str, api: &str, npm: &str) -> bool {
        self.modules
            .get(name)
            .and_then(|apis| apis.get(api))
            .is_some_and(|npms| npms.iter().any(|v| v == npm))
    }

    /// Returns true if `npm` is a published version of the data-only package.
    #[must_use]
    pub fn contains_data(&self, name: &str, npm: &str) -> bool {
        self.data
            .get(name)
            .is_some_and(|npms| npms.iter().any(|v| v == npm))
    }

    /// The latest `(api, npm)` pair of a module.
    ///
    /// Picks the greatest `api` version that has at least one `npm` version,
    /// then the greatest `npm` version within it.
    #[must_use]
    pub fn latest_module(&self, name: &str) -> Option<(&str, &str)> {
        let apis = self.modules.get(name)?;
        apis.iter()
            .filter_map(|(api, npms)| {
                max_version(npms.iter().map(String::as_str)).map(|npm| (api.as_str(), npm))
            })
            .max_by(|a, b| compare_versions(a.0, b.0))
    }

    /// The latest `npm` version of a data-only package.
    #[must_use]
    pub fn latest_data(&self, name: &str) -> Option<&str> {
        max_version(self.data.get(name)?.iter().map(String::as_str))
    }

    /// Number of names (modules and data packages) in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len() + self.data.len()
    }

    /// Returns true if the catalog lists nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.data.is_empty()
    }
}

/// Order two version strings.
///
/// Valid semver versions compare by semver precedence and sort above
/// anything that is not semver; non-semver strings compare lexically.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn max_version<'a>(versions: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    versions.max_by(|a, b| compare_versions(a, b))
}

fn newest_first<'a>(versions: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut sorted: Vec<&str> = versions.collect();
    sorted.sort_by(|a, b| compare_versions(b, a));
    sorted
}
