//! Project metadata and the `.serein.json` configuration file.

use crate::manifest::ManifestVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default project version.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Default build output directory recorded in `.serein.json`.
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Default dedicated server location recorded in `.serein.json`.
pub const DEFAULT_BDS_PATH: &str = "~/bds/";

/// Errors in user supplied project metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error("invalid project name '{0}': {1}")]
    InvalidName(String, &'static str),

    #[error("invalid version '{0}': {1}")]
    InvalidVersion(String, String),

    #[error("unknown language '{0}', expected 'ts' or 'js'")]
    UnknownLanguage(String),
}

/// Script language of the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ts,
    Js,
}

impl Language {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ts => "ts",
            Self::Js => "js",
        }
    }

    /// Script entry point relative to the project root.
    #[must_use]
    pub fn entry_file(&self) -> &'static str {
        match self {
            Self::Ts => "scripts/main.ts",
            Self::Js => "scripts/main.js",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ts" | "t" | "typescript" => Ok(Self::Ts),
            "js" | "j" | "javascript" => Ok(Self::Js),
            _ => Err(ProjectError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Everything needed to create a project besides its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Project name, used for both packs and `package.json`.
    pub name: String,
    /// Project version.
    pub version: semver::Version,
    /// Free-form description.
    pub description: String,
    /// Script language.
    pub language: Language,
    /// Whether to create a resource pack next to the behavior pack.
    pub resource_pack: bool,
    /// Whether scripts may use `eval` and `new Function`.
    pub allow_eval: bool,
}

impl ProjectOptions {
    /// Options with defaults for everything except the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid package name.
    pub fn new(name: impl Into<String>) -> Result<Self, ProjectError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            version: semver::Version::new(1, 0, 0),
            description: String::new(),
            language: Language::default(),
            resource_pack: true,
            allow_eval: false,
        })
    }

    /// Set the version from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a semver version.
    pub fn with_version(mut self, version: &str) -> Result<Self, ProjectError> {
        self.version = parse_version(version)?;
        Ok(self)
    }

    /// The version as a manifest number triple.
    #[must_use]
    pub fn version_array(&self) -> ManifestVersion {
        ManifestVersion::from_semver(&self.version)
    }

    /// The `.serein.json` contents for this project.
    #[must_use]
    pub fn config(&self) -> ProjectConfig {
        ProjectConfig {
            language: self.language,
            res: self.resource_pack,
            name: self.name.clone(),
            mc_preview: false,
            bds: false,
            bds_path: DEFAULT_BDS_PATH.to_string(),
            output: DEFAULT_OUTPUT_DIR.to_string(),
            mc_dir: None,
        }
    }
}

/// Parse a project version.
///
/// # Errors
///
/// Returns an error if the string is not a semver version.
pub fn parse_version(version: &str) -> Result<semver::Version, ProjectError> {
    semver::Version::parse(version.trim())
        .map_err(|e| ProjectError::InvalidVersion(version.to_string(), e.to_string()))
}

/// Validate a project name against npm package naming rules.
///
/// # Errors
///
/// Returns an error describing the first rule the name breaks.
pub fn validate_name(name: &str) -> Result<(), ProjectError> {
    let invalid = |reason| Err(ProjectError::InvalidName(name.to_string(), reason));

    if name.is_empty() {
        return invalid("name cannot be empty");
    }
    if name.len() > 214 {
        return invalid("name cannot exceed 214 characters");
    }
    if name.starts_with('.') || name.starts_with('_') {
        return invalid("name cannot start with '.' or '_'");
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return invalid("name cannot contain uppercase letters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    {
        return invalid("name can only contain letters, numbers, '-', '_', '.' and '~'");
    }
    Ok(())
}

/// Derive a valid project name from an arbitrary string such as a
/// directory name.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let mapped: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let trimmed = mapped.trim_start_matches(['.', '_', '-']);
    if trimmed.is_empty() {
        "addon".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Contents of `.serein.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Script language (`"ts"` or `"js"`).
    #[serde(rename = "type")]
    pub language: Language,
    /// Whether the project has a resource pack.
    pub res: bool,
    /// Project name.
    pub name: String,
    /// Deploy to the preview edition of the game.
    pub mc_preview: bool,
    /// Deploy to a dedicated server instead of the client.
    pub bds: bool,
    /// Dedicated server location.
    pub bds_path: String,
    /// Build output directory.
    pub output: String,
    /// Game data directory override.
    pub mc_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("my-addon").is_ok());
        assert!(validate_name("addon_2").is_ok());
        assert!(validate_name("a.b~c").is_ok());
    }

    #[test]
    fn test_validate_name_invalid() {
        assert!(validate_name("").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("_private").is_err());
        assert!(validate_name("MyAddon").is_err());
        assert!(validate_name("my addon").is_err());
        assert!(validate_name(&"a".repeat(215)).is_err());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("My Cool Addon"), "my-cool-addon");
        assert_eq!(sanitize_name(".config"), "config");
        assert_eq!(sanitize_name("***"), "addon");
        assert!(validate_name(&sanitize_name("Über Pack!")).is_ok());
    }

    #[test]
    fn test_options_version() {
        let options = ProjectOptions::new("demo").unwrap().with_version("2.3.4").unwrap();
        assert_eq!(options.version_array(), ManifestVersion::Numbers(vec![2, 3, 4]));
        assert!(ProjectOptions::new("demo").unwrap().with_version("1.0").is_err());
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("j".parse::<Language>().unwrap(), Language::Js);
        assert_eq!("TS".parse::<Language>().unwrap(), Language::Ts);
        assert!("rust".parse::<Language>().is_err());
    }

    #[test]
    fn test_config_json_shape() {
        let config = ProjectOptions::new("demo").unwrap().config();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "ts");
        assert_eq!(json["res"], true);
        assert_eq!(json["output"], "build");
        assert!(json["mc_dir"].is_null());
    }
}
