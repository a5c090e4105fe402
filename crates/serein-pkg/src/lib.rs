//! Dependency resolution and manifest synchronization for Serein projects.
//!
//! This crate provides:
//! - The version catalog of script modules and data packages
//! - Resolution of per-package choices into concrete versions
//! - Assembly of `manifest.json`, `package.json` and `.serein.json` for new projects
//! - Selective re-resolution and single-package edits of existing projects
//! - Atomic reading and writing of project files

mod artifact;
mod assemble;
mod catalog;
mod dependency;
mod descriptor;
mod edit;
mod manifest;
mod package;
mod project;
mod registry;
mod select;
mod switch;
mod template;

pub use artifact::{ArtifactError, ArtifactWriter, ProjectFiles};
pub use assemble::{dependency_lists, AssembledProject, DependencyLists, ManifestAssembler};
pub use catalog::{compare_versions, CatalogError, DataVersions, ModuleVersions, VersionCatalog};
pub use dependency::{
    known_package, package_kind, resolve_choice, Dependency, DependencyChoice, KnownPackage,
    PackageKind, ResolveError, VersionCoordinate, KNOWN_PACKAGES, SERVER_PACKAGE,
};
pub use descriptor::{PackageDescriptor, BUILD_TOOLCHAIN};
pub use edit::{add_dependency, remove_dependency, EditError};
pub use manifest::{
    ManifestDependency, ManifestHeader, ManifestModule, ManifestVersion, ProjectManifest,
    FORMAT_VERSION, MIN_ENGINE_VERSION,
};
pub use package::{
    ProjectLayout, BEHAVIOR_DIR, CONFIG_FILE, GULPFILE, MANIFEST_FILE, MCATTRIBUTES_FILE,
    NODE_MODULES_DIR, PACKAGE_FILE, RESOURCE_DIR, SCRIPTS_DIR, TSCONFIG_FILE,
};
pub use project::{
    parse_version, sanitize_name, validate_name, Language, ProjectConfig, ProjectError,
    ProjectOptions, DEFAULT_BDS_PATH, DEFAULT_OUTPUT_DIR, DEFAULT_VERSION,
};
pub use registry::{CatalogClient, CatalogConfig, DEFAULT_REGISTRY, REGISTRY_ENV};
pub use select::{DependencySelector, Selection};
pub use switch::{
    EligibleEntry, EntryOutcome, EntryState, SwitchReport, SwitchResolver, VENDOR_PATTERN,
};
pub use template::{tsconfig, DEFAULT_SCRIPT, MCATTRIBUTES};
