//! npm package descriptor (`package.json`) model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Build tools every new project depends on, after the resolved packages.
pub const BUILD_TOOLCHAIN: &[(&str, &str)] = &[
    ("del", "7.0.0"),
    ("gulp", "^4.0.2"),
    ("gulp-cli", "^2.3.0"),
    ("gulp-esbuild", "^0.11.0"),
    ("gulp-typescript", "^6.0.0-alpha.1"),
    ("gulp-zip", "^5.1.0"),
];

/// The subset of `package.json` this crate manages.
///
/// `dependencies` keeps its key order and any entry this crate did not
/// write; unknown top-level fields are kept in `extra`. npm accepts a private
/// package without `name` or `version`, so both are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Module system (`"module"` for new projects).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub dependencies: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageDescriptor {
    /// A descriptor for a new ES module package without dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            module_type: Some("module".to_string()),
            description: Some(String::new()),
            dependencies: Map::new(),
            extra: Map::new(),
        }
    }

    /// Parse a descriptor from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a field has the wrong type.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Serialize as pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// The version requirement recorded for a dependency.
    #[must_use]
    pub fn dependency_version(&self, name: &str) -> Option<&str> {
        self.dependencies.get(name).and_then(Value::as_str)
    }

    /// Set a dependency version, keeping its position if already present.
    ///
    /// Returns the previous version, if any.
    pub fn set_dependency(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Option<Value> {
        self.dependencies
            .insert(name.into(), Value::String(version.into()))
    }

    /// Remove a dependency, keeping the order of the others.
    pub fn remove_dependency(&mut self, name: &str) -> Option<Value> {
        self.dependencies.shift_remove(name)
    }

    /// Write the dependency table into the document this descriptor was
    /// parsed from.
    ///
    /// Every other field of `doc` is left as it is, including its position.
    pub fn merge_dependencies_into(&self, doc: &mut Map<String, Value>) {
        if self.dependencies.is_empty() && !doc.contains_key("dependencies") {
            return;
        }
        doc.insert(
            "dependencies".to_string(),
            Value::Object(self.dependencies.clone()),
        );
    }

    /// Append the build tool chain entries that are not present yet.
    pub fn add_build_toolchain(&mut self) {
        for (name, version) in BUILD_TOOLCHAIN {
            if !self.dependencies.contains_key(*name) {
                self.set_dependency(*name, *version);
            }
        }
    }
}
