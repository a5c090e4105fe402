//! Add-on manifest (`manifest.json`) model.
//!
//! Only the fields this crate reads or writes are typed. Everything else is
//! kept in `extra` maps so a loaded manifest is written back without losing
//! user edits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The manifest `format_version` written for new projects.
pub const FORMAT_VERSION: u32 = 2;

/// The `min_engine_version` written for new projects.
pub const MIN_ENGINE_VERSION: [u64; 3] = [1, 19, 20];

/// A version as it appears in a manifest: `[1, 0, 0]` or `"1.2.0-beta"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestVersion {
    /// Numeric triple used by headers, modules and pack references.
    Numbers(Vec<u64>),
    /// Version string used by script module references.
    Text(String),
}

impl ManifestVersion {
    /// The numeric form of a semver version.
    #[must_use]
    pub fn from_semver(version: &semver::Version) -> Self {
        Self::Numbers(vec![version.major, version.minor, version.patch])
    }
}

impl fmt::Display for ManifestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Numbers(parts) => {
                let joined: Vec<String> = parts.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join("."))
            }
        }
    }
}

/// The complete manifest of a behavior or resource pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Manifest schema version.
    pub format_version: Value,

    /// Pack identity.
    pub header: ManifestHeader,

    /// Modules contained in the pack.
    #[serde(default)]
    pub modules: Vec<ManifestModule>,

    /// Script modules and packs this pack depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ManifestDependency>,

    /// Optional engine capabilities (`script_eval`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,

    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Manifest header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestHeader {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub uuid: String,

    pub version: ManifestVersion,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_engine_version: Option<ManifestVersion>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One module of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestModule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Module type (`script`, `resources`, `data`, ...).
    #[serde(rename = "type")]
    pub kind: String,

    pub uuid: String,

    pub version: ManifestVersion,

    /// Script entry point, for script modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the manifest dependency list.
///
/// Script modules are referenced by `module_name`, other packs by `uuid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestDependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    pub version: ManifestVersion,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ManifestDependency {
    /// Reference a script module by name.
    #[must_use]
    pub fn module(name: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            uuid: None,
            module_name: Some(name.into()),
            version: ManifestVersion::Text(api.into()),
            extra: Map::new(),
        }
    }

    /// Reference another pack by its header uuid.
    #[must_use]
    pub fn pack(uuid: impl Into<String>, version: ManifestVersion) -> Self {
        Self {
            uuid: Some(uuid.into()),
            module_name: None,
            version,
            extra: Map::new(),
        }
    }

    /// Returns true if a raw dependency object names the same module or pack.
    fn refers_to(&self, raw: &Value) -> bool {
        let field = |key: &str| raw.get(key).and_then(Value::as_str);
        match (&self.module_name, &self.uuid) {
            (Some(name), _) => field("module_name") == Some(name.as_str()),
            (None, Some(uuid)) => field("uuid") == Some(uuid.as_str()),
            (None, None) => false,
        }
    }
}

impl ProjectManifest {
    /// Parse a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or misses required fields.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Serialize the manifest as pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Write the dependency list into the document this manifest was parsed
    /// from.
    ///
    /// An entry that was already in `doc` keeps its own fields and key order;
    /// only its `version` is replaced. New entries are written in full and
    /// dropped entries disappear. Everything outside `dependencies` is left
    /// as it is.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry cannot be serialized.
    pub fn merge_dependencies_into(
        &self,
        doc: &mut Map<String, Value>,
    ) -> Result<(), serde_json::Error> {
        let mut previous: Vec<Option<Value>> = match doc.get_mut("dependencies") {
            Some(Value::Array(entries)) => entries.drain(..).map(Some).collect(),
            _ => Vec::new(),
        };

        let mut merged = Vec::with_capacity(self.dependencies.len());
        for dependency in &self.dependencies {
            let typed = serde_json::to_value(dependency)?;
            let slot = previous.iter_mut().find(|slot| match slot {
                Some(raw) => *raw == typed || dependency.refers_to(raw),
                None => false,
            });
            let entry = match slot.and_then(Option::take) {
                Some(Value::Object(mut fields)) => {
                    fields.insert(
                        "version".to_string(),
                        serde_json::to_value(&dependency.version)?,
                    );
                    Value::Object(fields)
                }
                _ => typed,
            };
            merged.push(entry);
        }

        if merged.is_empty() && !doc.contains_key("dependencies") {
            return Ok(());
        }
        doc.insert("dependencies".to_string(), Value::Array(merged));
        Ok(())
    }

    /// Names of all script modules referenced in the dependency list.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter_map(|d| d.module_name.as_deref())
    }

    /// Find the dependency entry for a script module.
    #[must_use]
    pub fn module_dependency(&self, name: &str) -> Option<&ManifestDependency> {
        self.dependencies
            .iter()
            .find(|d| d.module_name.as_deref() == Some(name))
    }

    /// Find the dependency entry that references a pack by uuid.
    #[must_use]
    pub fn pack_dependency(&self, uuid: &str) -> Option<&ManifestDependency> {
        self.dependencies
            .iter()
            .find(|d| d.uuid.as_deref() == Some(uuid))
    }
}
