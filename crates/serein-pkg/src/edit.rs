//! Adding and removing single dependencies of an existing project.

use crate::catalog::VersionCatalog;
use crate::dependency::{
    known_package, package_kind, resolve_choice, Dependency, DependencyChoice, ResolveError,
};
use crate::descriptor::PackageDescriptor;
use crate::manifest::{ManifestDependency, ManifestVersion, ProjectManifest};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while editing the dependencies of a project.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("'{0}' is required by every project and cannot be removed")]
    Mandatory(String),

    #[error("'{0}' is not a dependency of this project")]
    NotPresent(String),
}

/// Add a dependency, or change the versions of one already present.
///
/// `Skip` is treated as `Latest`. A module that already has a manifest entry
/// keeps its position; otherwise a new entry is appended. Data-only packages
/// only touch `package.json`.
///
/// # Errors
///
/// Returns an error if the choice does not resolve against the catalog. The
/// project is not modified in that case.
pub fn add_dependency(
    manifest: &mut ProjectManifest,
    package: &mut PackageDescriptor,
    catalog: &VersionCatalog,
    name: &str,
    choice: DependencyChoice,
) -> Result<Dependency, EditError> {
    let choice = match choice {
        DependencyChoice::Skip => DependencyChoice::Latest,
        other => other,
    };
    let dependency = resolve_choice(catalog, name, package_kind(catalog, name), &choice)?;
    let Some(coordinate) = dependency.coordinate.as_ref() else {
        return Ok(dependency);
    };

    if let Some(ref api) = coordinate.api {
        let existing = manifest
            .dependencies
            .iter_mut()
            .find(|d| d.module_name.as_deref() == Some(name));
        match existing {
            Some(entry) => entry.version = ManifestVersion::Text(api.clone()),
            None => manifest
                .dependencies
                .push(ManifestDependency::module(name, api.as_str())),
        }
    }
    package.set_dependency(name, coordinate.npm.as_str());

    debug!(package = name, version = %coordinate, "added dependency");
    Ok(dependency)
}

/// Remove a dependency from both the manifest and `package.json`.
///
/// # Errors
///
/// Returns [`EditError::Mandatory`] for the server module and
/// [`EditError::NotPresent`] if neither file lists the name.
pub fn remove_dependency(
    manifest: &mut ProjectManifest,
    package: &mut PackageDescriptor,
    name: &str,
) -> Result<(), EditError> {
    if known_package(name).is_some_and(|p| p.mandatory) {
        return Err(EditError::Mandatory(name.to_string()));
    }

    let before = manifest.dependencies.len();
    manifest
        .dependencies
        .retain(|d| d.module_name.as_deref() != Some(name));
    let from_manifest = manifest.dependencies.len() != before;
    let from_package = package.remove_dependency(name).is_some();

    if !from_manifest && !from_package {
        return Err(EditError::NotPresent(name.to_string()));
    }

    debug!(package = name, "removed dependency");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::SERVER_PACKAGE;

    fn catalog() -> VersionCatalog {
        VersionCatalog::from_json(
            r#"{
                "@minecraft/server": {"1.2.0": ["1.2.0-beta"]},
                "@minecraft/server-ui": {"1.0.0": ["1.0.0-beta"], "1.1.0": ["1.1.0-beta"]}
            }"#,
            r#"{"@minecraft/vanilla-data": ["1.20.10"], "@minecraft/math": ["1.0.0", "1.1.0"]}"#,
        )
        .unwrap()
    }

    fn project() -> (ProjectManifest, PackageDescriptor) {
        let manifest = ProjectManifest::parse(
            r#"{
              "format_version": 2,
              "header": {"name": "demo", "description": "", "uuid": "h", "version": [1, 0, 0]},
              "dependencies": [
                {"module_name": "@minecraft/server", "version": "1.2.0"},
                {"module_name": "@minecraft/server-ui", "version": "1.0.0"}
              ]
            }"#,
        )
        .unwrap();
        let mut package = PackageDescriptor::new("demo", "1.0.0");
        package.set_dependency(SERVER_PACKAGE, "1.2.0-beta");
        package.set_dependency("@minecraft/server-ui", "1.0.0-beta");
        package.set_dependency("gulp", "^4.0.2");
        (manifest, package)
    }

    #[test]
    fn test_add_updates_existing_entry_in_place() {
        let (mut manifest, mut package) = project();
        add_dependency(
            &mut manifest,
            &mut package,
            &catalog(),
            "@minecraft/server-ui",
            DependencyChoice::Latest,
        )
        .unwrap();

        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(
            manifest.dependencies[1].version,
            ManifestVersion::Text("1.1.0".to_string())
        );
        assert_eq!(package.dependency_version("@minecraft/server-ui"), Some("1.1.0-beta"));
    }

    #[test]
    fn test_add_data_package_only_touches_descriptor() {
        let (mut manifest, mut package) = project();
        let dep = add_dependency(
            &mut manifest,
            &mut package,
            &catalog(),
            "@minecraft/vanilla-data",
            DependencyChoice::Skip,
        )
        .unwrap();

        assert!(dep.is_data_only());
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(package.dependency_version("@minecraft/vanilla-data"), Some("1.20.10"));
    }

    #[test]
    fn test_add_data_package_outside_known_table() {
        let (mut manifest, mut package) = project();
        let dep = add_dependency(
            &mut manifest,
            &mut package,
            &catalog(),
            "@minecraft/math",
            DependencyChoice::Latest,
        )
        .unwrap();

        assert!(dep.is_data_only());
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(package.dependency_version("@minecraft/math"), Some("1.1.0"));
    }

    #[test]
    fn test_add_unknown_leaves_project_untouched() {
        let (mut manifest, mut package) = project();
        let before = (manifest.clone(), package.clone());
        let err = add_dependency(
            &mut manifest,
            &mut package,
            &catalog(),
            "@minecraft/server-net",
            DependencyChoice::Latest,
        )
        .unwrap_err();

        assert!(matches!(err, EditError::Resolve(ResolveError::UnknownDependency { .. })));
        assert_eq!((manifest, package), before);
    }

    #[test]
    fn test_remove_dependency() {
        let (mut manifest, mut package) = project();
        remove_dependency(&mut manifest, &mut package, "@minecraft/server-ui").unwrap();
        assert_eq!(manifest.module_names().collect::<Vec<_>>(), vec![SERVER_PACKAGE]);
        assert_eq!(package.dependency_version("@minecraft/server-ui"), None);
        assert_eq!(package.dependency_version("gulp"), Some("^4.0.2"));

        let err = remove_dependency(&mut manifest, &mut package, "@minecraft/server-ui");
        assert_eq!(
            err,
            Err(EditError::NotPresent("@minecraft/server-ui".to_string()))
        );
    }

    #[test]
    fn test_remove_server_is_refused() {
        let (mut manifest, mut package) = project();
        let err = remove_dependency(&mut manifest, &mut package, SERVER_PACKAGE).unwrap_err();
        assert_eq!(err, EditError::Mandatory(SERVER_PACKAGE.to_string()));
        assert!(manifest.module_dependency(SERVER_PACKAGE).is_some());
    }
}
