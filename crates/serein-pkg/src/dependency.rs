//! Dependency records and their resolution against the catalog.
//!
//! Every flow that turns a user decision into concrete versions (project
//! creation, switching, adding) goes through [`resolve_choice`].

use crate::catalog::VersionCatalog;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// The mandatory server module every project depends on.
pub const SERVER_PACKAGE: &str = "@minecraft/server";

/// Errors that can occur while resolving a dependency choice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The requested version pair is not jointly present in the catalog.
    #[error("invalid version for '{name}': {reason}")]
    InvalidCoordinate { name: String, reason: String },

    /// The dependency is not listed in the catalog at all.
    #[error("dependency '{name}' is not listed in the version catalog")]
    UnknownDependency { name: String },
}

/// How a dependency is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Published both as a manifest module (`api`) and on npm (`npm`).
    Module,
    /// Published on npm only; never appears in `manifest.json`.
    Data,
}

/// A dependency the tool knows how to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownPackage {
    /// Package name, identical in the catalog, the manifest and npm.
    pub name: &'static str,
    /// How the package is published.
    pub kind: PackageKind,
    /// Mandatory packages are always needed and never offered as optional.
    pub mandatory: bool,
}

/// The packages offered when creating a project, in output order.
pub const KNOWN_PACKAGES: &[KnownPackage] = &[
    KnownPackage {
        name: SERVER_PACKAGE,
        kind: PackageKind::Module,
        mandatory: true,
    },
    KnownPackage {
        name: "@minecraft/server-ui",
        kind: PackageKind::Module,
        mandatory: false,
    },
    KnownPackage {
        name: "@minecraft/server-admin",
        kind: PackageKind::Module,
        mandatory: false,
    },
    KnownPackage {
        name: "@minecraft/server-gametest",
        kind: PackageKind::Module,
        mandatory: false,
    },
    KnownPackage {
        name: "@minecraft/server-net",
        kind: PackageKind::Module,
        mandatory: false,
    },
    KnownPackage {
        name: "@minecraft/vanilla-data",
        kind: PackageKind::Data,
        mandatory: false,
    },
];

/// Look up a known package by name.
#[must_use]
pub fn known_package(name: &str) -> Option<&'static KnownPackage> {
    KNOWN_PACKAGES.iter().find(|p| p.name == name)
}

/// The publication kind of a package.
///
/// Names outside the known table are data-only if the catalog publishes them
/// as data packages, manifest modules otherwise.
#[must_use]
pub fn package_kind(catalog: &VersionCatalog, name: &str) -> PackageKind {
    match known_package(name) {
        Some(package) => package.kind,
        None if catalog.has_data(name) => PackageKind::Data,
        None => PackageKind::Module,
    }
}

/// A version in each of the two numbering spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCoordinate {
    /// Version used in the manifest; `None` for data-only packages.
    pub api: Option<String>,
    /// Version used in `package.json`.
    pub npm: String,
}

impl VersionCoordinate {
    /// A coordinate for a manifest module.
    #[must_use]
    pub fn module(api: impl Into<String>, npm: impl Into<String>) -> Self {
        Self {
            api: Some(api.into()),
            npm: npm.into(),
        }
    }

    /// A coordinate for a data-only package.
    #[must_use]
    pub fn data(npm: impl Into<String>) -> Self {
        Self {
            api: None,
            npm: npm.into(),
        }
    }
}

impl fmt::Display for VersionCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.api {
            Some(ref api) => write!(f, "{api} (npm {})", self.npm),
            None => write!(f, "npm {}", self.npm),
        }
    }
}

/// One dependency of a project after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Package name.
    pub name: String,
    /// Whether the project uses this dependency.
    pub need: bool,
    /// Resolved versions; present iff `need` is true.
    pub coordinate: Option<VersionCoordinate>,
}

impl Dependency {
    /// A dependency the project does not use.
    #[must_use]
    pub fn unused(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            need: false,
            coordinate: None,
        }
    }

    /// A used dependency with resolved versions.
    #[must_use]
    pub fn resolved(name: impl Into<String>, coordinate: VersionCoordinate) -> Self {
        Self {
            name: name.into(),
            need: true,
            coordinate: Some(coordinate),
        }
    }

    /// Returns true if the dependency is used and only published on npm.
    #[must_use]
    pub fn is_data_only(&self) -> bool {
        self.coordinate.as_ref().is_some_and(|c| c.api.is_none())
    }
}

/// What the user wants for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyChoice {
    /// Do not use the dependency (or leave it unchanged when switching).
    Skip,
    /// Use the newest versions in the catalog.
    Latest,
    /// Use exactly these versions. `api` must be `None` for data packages.
    Pinned { api: Option<String>, npm: String },
}

impl DependencyChoice {
    /// Pin a module to an `api`/`npm` pair.
    #[must_use]
    pub fn pinned(api: impl Into<String>, npm: impl Into<String>) -> Self {
        Self::Pinned {
            api: Some(api.into()),
            npm: npm.into(),
        }
    }

    /// Pin a data-only package to an `npm` version.
    #[must_use]
    pub fn pinned_data(npm: impl Into<String>) -> Self {
        Self::Pinned {
            api: None,
            npm: npm.into(),
        }
    }
}

/// Resolve one choice against the catalog.
///
/// `Skip` never consults the catalog. `Latest` and `Pinned` require the name
/// to be listed in the catalog under the table matching `kind`; pinned
/// versions must exist there as given.
pub fn resolve_choice(
    catalog: &VersionCatalog,
    name: &str,
    kind: PackageKind,
    choice: &DependencyChoice,
) -> Result<Dependency, ResolveError> {
    let coordinate = match choice {
        DependencyChoice::Skip => return Ok(Dependency::unused(name)),
        DependencyChoice::Latest => latest_coordinate(catalog, name, kind)?,
        DependencyChoice::Pinned { api, npm } => {
            pinned_coordinate(catalog, name, kind, api.as_deref(), npm)?
        }
    };

    debug!(package = name, version = %coordinate, "resolved dependency");
    Ok(Dependency::resolved(name, coordinate))
}

fn latest_coordinate(
    catalog: &VersionCatalog,
    name: &str,
    kind: PackageKind,
) -> Result<VersionCoordinate, ResolveError> {
    let unknown = || ResolveError::UnknownDependency {
        name: name.to_string(),
    };

    match kind {
        PackageKind::Module => {
            if !catalog.has_module(name) {
                return Err(unknown());
            }
            catalog
                .latest_module(name)
                .map(|(api, npm)| VersionCoordinate::module(api, npm))
                .ok_or_else(|| ResolveError::InvalidCoordinate {
                    name: name.to_string(),
                    reason: "the catalog lists no published versions".to_string(),
                })
        }
        PackageKind::Data => {
            if !catalog.has_data(name) {
                return Err(unknown());
            }
            catalog
                .latest_data(name)
                .map(VersionCoordinate::data)
                .ok_or_else(|| ResolveError::InvalidCoordinate {
                    name: name.to_string(),
                    reason: "the catalog lists no published versions".to_string(),
                })
        }
    }
}

fn pinned_coordinate(
    catalog: &VersionCatalog,
    name: &str,
    kind: PackageKind,
    api: Option<&str>,
    npm: &str,
) -> Result<VersionCoordinate, ResolveError> {
    let invalid = |reason: String| ResolveError::InvalidCoordinate {
        name: name.to_string(),
        reason,
    };

    match (kind, api) {
        (PackageKind::Module, Some(api)) => {
            if !catalog.has_module(name) {
                return Err(ResolveError::UnknownDependency {
                    name: name.to_string(),
                });
            }
            if !catalog.contains_pair(name, api, npm) {
                return Err(invalid(format!(
                    "npm version '{npm}' is not published for api version '{api}'"
                )));
            }
            Ok(VersionCoordinate::module(api, npm))
        }
        (PackageKind::Module, None) => Err(invalid(
            "a manifest module needs an api version".to_string(),
        )),
        (PackageKind::Data, Some(api)) => Err(invalid(format!(
            "data-only package has no api version, got '{api}'"
        ))),
        (PackageKind::Data, None) => {
            if !catalog.has_data(name) {
                return Err(ResolveError::UnknownDependency {
                    name: name.to_string(),
                });
            }
            if !catalog.contains_data(name, npm) {
                return Err(invalid(format!("npm version '{npm}' is not published")));
            }
            Ok(VersionCoordinate::data(npm))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VersionCatalog {
        VersionCatalog::from_json(
            r#"{"@minecraft/server": {"1.2.0": ["1.2.0-beta"], "1.1.0": ["1.1.0", "1.1.1"]}}"#,
            r#"{"@minecraft/vanilla-data": ["1.20.10", "1.20.30"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_known_packages_have_single_mandatory_server() {
        let mandatory: Vec<_> = KNOWN_PACKAGES.iter().filter(|p| p.mandatory).collect();
        assert_eq!(mandatory.len(), 1);
        assert_eq!(mandatory[0].name, SERVER_PACKAGE);
        let catalog = VersionCatalog::from_json("{}", r#"{"@minecraft/math": ["1.0.0"]}"#).unwrap();
        assert_eq!(package_kind(&catalog, "@minecraft/vanilla-data"), PackageKind::Data);
        assert_eq!(package_kind(&catalog, "@minecraft/math"), PackageKind::Data);
        assert_eq!(package_kind(&catalog, "@minecraft/something-new"), PackageKind::Module);
    }

    #[test]
    fn test_skip_does_not_touch_catalog() {
        let dep = resolve_choice(
            &VersionCatalog::default(),
            "@minecraft/server-ui",
            PackageKind::Module,
            &DependencyChoice::Skip,
        )
        .unwrap();
        assert_eq!(dep, Dependency::unused("@minecraft/server-ui"));
    }

    #[test]
    fn test_latest_module_and_data() {
        let dep = resolve_choice(
            &catalog(),
            SERVER_PACKAGE,
            PackageKind::Module,
            &DependencyChoice::Latest,
        )
        .unwrap();
        assert_eq!(
            dep.coordinate,
            Some(VersionCoordinate::module("1.2.0", "1.2.0-beta"))
        );

        let dep = resolve_choice(
            &catalog(),
            "@minecraft/vanilla-data",
            PackageKind::Data,
            &DependencyChoice::Latest,
        )
        .unwrap();
        assert!(dep.is_data_only());
        assert_eq!(dep.coordinate, Some(VersionCoordinate::data("1.20.30")));
    }

    #[test]
    fn test_pinned_pair_must_exist_jointly() {
        let ok = resolve_choice(
            &catalog(),
            SERVER_PACKAGE,
            PackageKind::Module,
            &DependencyChoice::pinned("1.1.0", "1.1.1"),
        )
        .unwrap();
        assert_eq!(ok.coordinate, Some(VersionCoordinate::module("1.1.0", "1.1.1")));

        let err = resolve_choice(
            &catalog(),
            SERVER_PACKAGE,
            PackageKind::Module,
            &DependencyChoice::pinned("1.2.0", "1.1.1"),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_pinned_kind_mismatch_is_invalid() {
        let err = resolve_choice(
            &catalog(),
            SERVER_PACKAGE,
            PackageKind::Module,
            &DependencyChoice::pinned_data("1.2.0-beta"),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCoordinate { .. }));

        let err = resolve_choice(
            &catalog(),
            "@minecraft/vanilla-data",
            PackageKind::Data,
            &DependencyChoice::pinned("1.0.0", "1.20.10"),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_unknown_name_fails() {
        let err = resolve_choice(
            &catalog(),
            "@minecraft/server-net",
            PackageKind::Module,
            &DependencyChoice::Latest,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownDependency {
                name: "@minecraft/server-net".to_string()
            }
        );
    }

    #[test]
    fn test_coordinate_display() {
        assert_eq!(
            VersionCoordinate::module("1.2.0", "1.2.0-beta").to_string(),
            "1.2.0 (npm 1.2.0-beta)"
        );
        assert_eq!(VersionCoordinate::data("1.20.10").to_string(), "npm 1.20.10");
    }
}
