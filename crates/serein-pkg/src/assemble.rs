//! Building the generated manifests and package descriptor of a new project.

use crate::dependency::Dependency;
use crate::descriptor::PackageDescriptor;
use crate::manifest::{
    ManifestDependency, ManifestHeader, ManifestModule, ManifestVersion, ProjectManifest,
    FORMAT_VERSION, MIN_ENGINE_VERSION,
};
use crate::project::{ProjectConfig, ProjectOptions};
use crate::select::Selection;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Script module version of new behavior packs.
const SCRIPT_MODULE_VERSION: [u64; 3] = [2, 0, 0];

/// Entry point the build pipeline emits into the behavior pack.
const SCRIPT_ENTRY: &str = "scripts/main.js";

/// The in-memory form of every generated descriptor of a new project.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledProject {
    pub behavior_manifest: ProjectManifest,
    pub resource_manifest: Option<ProjectManifest>,
    pub package: PackageDescriptor,
    pub config: ProjectConfig,
}

/// The two dependency lists derived from a set of dependencies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DependencyLists {
    /// Entries for the behavior manifest.
    pub manifest: Vec<ManifestDependency>,
    /// `name -> npm version` for the package descriptor.
    pub package: Map<String, Value>,
}

/// Build the manifest and package dependency lists.
///
/// The resource pack reference, when given, comes first. Every needed
/// dependency gets a package entry; only those with an `api` version get a
/// manifest entry.
pub fn dependency_lists<'a>(
    dependencies: impl IntoIterator<Item = &'a Dependency>,
    resource_pack: Option<(&str, ManifestVersion)>,
) -> DependencyLists {
    let mut lists = DependencyLists::default();

    if let Some((uuid, version)) = resource_pack {
        lists.manifest.push(ManifestDependency::pack(uuid, version));
    }

    for dependency in dependencies {
        let Some(coordinate) = dependency.coordinate.as_ref().filter(|_| dependency.need) else {
            continue;
        };
        if let Some(ref api) = coordinate.api {
            lists
                .manifest
                .push(ManifestDependency::module(&dependency.name, api));
        }
        lists.package.insert(
            dependency.name.clone(),
            Value::String(coordinate.npm.clone()),
        );
    }

    lists
}

/// Assembles the descriptors of a new project.
#[derive(Debug, Clone, Copy)]
pub struct ManifestAssembler<'a> {
    options: &'a ProjectOptions,
}

impl<'a> ManifestAssembler<'a> {
    #[must_use]
    pub fn new(options: &'a ProjectOptions) -> Self {
        Self { options }
    }

    /// Build all descriptors from a resolved selection.
    ///
    /// With a resource pack, one fresh uuid identifies it both in its own
    /// header and in the behavior pack's dependency list.
    #[must_use]
    pub fn assemble(&self, selection: &Selection) -> AssembledProject {
        let options = self.options;
        let resource_uuid = options.resource_pack.then(new_uuid);

        let lists = dependency_lists(
            selection.iter(),
            resource_uuid
                .as_deref()
                .map(|uuid| (uuid, options.version_array())),
        );

        let behavior_manifest = ProjectManifest {
            format_version: Value::from(FORMAT_VERSION),
            header: self.header(new_uuid()),
            modules: vec![ManifestModule {
                description: Some("Script resources".to_string()),
                language: Some("javascript".to_string()),
                kind: "script".to_string(),
                uuid: new_uuid(),
                version: ManifestVersion::Numbers(SCRIPT_MODULE_VERSION.to_vec()),
                entry: Some(SCRIPT_ENTRY.to_string()),
                extra: Map::new(),
            }],
            dependencies: lists.manifest,
            capabilities: Some(if options.allow_eval {
                vec!["script_eval".to_string()]
            } else {
                Vec::new()
            }),
            extra: Map::new(),
        };

        let resource_manifest = resource_uuid.map(|uuid| ProjectManifest {
            format_version: Value::from(FORMAT_VERSION),
            header: self.header(uuid),
            modules: vec![ManifestModule {
                description: Some(options.description.clone()),
                language: None,
                kind: "resources".to_string(),
                uuid: new_uuid(),
                version: options.version_array(),
                entry: None,
                extra: Map::new(),
            }],
            dependencies: Vec::new(),
            capabilities: None,
            extra: Map::new(),
        });

        let mut package = PackageDescriptor::new(&options.name, options.version.to_string());
        package.description = Some(options.description.clone());
        package.dependencies = lists.package;
        package.add_build_toolchain();

        AssembledProject {
            behavior_manifest,
            resource_manifest,
            package,
            config: options.config(),
        }
    }

    fn header(&self, uuid: String) -> ManifestHeader {
        ManifestHeader {
            name: self.options.name.clone(),
            description: self.options.description.clone(),
            uuid,
            version: self.options.version_array(),
            min_engine_version: Some(ManifestVersion::Numbers(MIN_ENGINE_VERSION.to_vec())),
            extra: Map::new(),
        }
    }
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}
