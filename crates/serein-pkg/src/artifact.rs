//! Reading and writing project files.
//!
//! Every write goes to a temporary file in the target directory that is then
//! renamed over the destination, so a file is either fully old or fully new.

use crate::assemble::AssembledProject;
use crate::descriptor::PackageDescriptor;
use crate::manifest::ProjectManifest;
use crate::package::{ProjectLayout, GULPFILE, MCATTRIBUTES_FILE, SCRIPTS_DIR, TSCONFIG_FILE};
use crate::project::Language;
use crate::template::{tsconfig, DEFAULT_SCRIPT, MCATTRIBUTES};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while reading or writing project files.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("cannot use {}: {reason}", path.display())]
    CorruptArtifact { path: PathBuf, reason: String },

    #[error("a project already exists in {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The descriptors of an existing project that dependency edits touch.
///
/// The documents as read from disk are kept alongside the typed models, so
/// writing back only changes the dependency tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFiles {
    /// `behavior_packs/manifest.json`.
    pub manifest: ProjectManifest,
    /// `package.json`.
    pub package: PackageDescriptor,
    manifest_doc: Document,
    package_doc: Document,
}

/// A JSON object as read from disk, with the indentation it used.
#[derive(Debug, Clone, PartialEq)]
struct Document {
    fields: Map<String, Value>,
    indent: String,
}

impl Document {
    fn parse(path: &Path, text: &str) -> Result<Self, ArtifactError> {
        let fields = serde_json::from_str(text).map_err(|e| corrupt(path, &e))?;
        Ok(Self {
            fields,
            indent: detect_indent(text),
        })
    }
}

/// Reads and writes the files of one project.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    layout: ProjectLayout,
}

impl ArtifactWriter {
    #[must_use]
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Atomically write raw contents to a path relative to the project root.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory, the temporary file or the rename
    /// fails.
    pub fn write_bytes(
        &self,
        relative: impl AsRef<Path>,
        contents: &[u8],
    ) -> Result<PathBuf, ArtifactError> {
        let path = self.layout.path(relative);
        let io_err = |source| ArtifactError::Io {
            path: path.clone(),
            source,
        };

        let parent = path.parent().unwrap_or(self.layout.root.as_path());
        fs::create_dir_all(parent).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(contents).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        debug!(path = %path.display(), bytes = contents.len(), "wrote file");
        Ok(path)
    }

    /// Atomically write text.
    ///
    /// # Errors
    ///
    /// See [`write_bytes`](Self::write_bytes).
    pub fn write_text(
        &self,
        relative: impl AsRef<Path>,
        contents: &str,
    ) -> Result<PathBuf, ArtifactError> {
        self.write_bytes(relative, contents.as_bytes())
    }

    /// Atomically write a value as two-space indented JSON with a trailing
    /// newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_json<T: Serialize>(
        &self,
        relative: impl AsRef<Path>,
        value: &T,
    ) -> Result<PathBuf, ArtifactError> {
        let relative = relative.as_ref();
        let mut out =
            serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Serialize {
                path: self.layout.path(relative),
                source,
            })?;
        out.push('\n');
        self.write_text(relative, &out)
    }

    /// Write a loaded document back with its own indentation.
    fn write_document(
        &self,
        relative: impl AsRef<Path>,
        doc: &Document,
    ) -> Result<PathBuf, ArtifactError> {
        let relative = relative.as_ref();
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(doc.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        doc.fields
            .serialize(&mut serializer)
            .map_err(|source| ArtifactError::Serialize {
                path: self.layout.path(relative),
                source,
            })?;
        out.push(b'\n');
        self.write_bytes(relative, &out)
    }

    /// Create every file of a new project.
    ///
    /// Returns the written paths in write order. The behavior pack manifest
    /// marks a project as initialized, so it is written last and a failed
    /// scaffold can simply be retried.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::AlreadyInitialized`] if a behavior pack
    /// manifest already exists, or the first failed write.
    pub fn scaffold(
        &self,
        project: &AssembledProject,
        language: Language,
        gulpfile: &[u8],
    ) -> Result<Vec<PathBuf>, ArtifactError> {
        let layout = &self.layout;
        if layout.is_initialized() {
            return Err(ArtifactError::AlreadyInitialized(layout.root.clone()));
        }

        let mut dirs = vec![layout.behavior_dir().join(SCRIPTS_DIR), layout.scripts_dir()];
        if project.resource_manifest.is_some() {
            dirs.push(layout.resource_dir());
        }
        for dir in dirs {
            fs::create_dir_all(&dir).map_err(|source| ArtifactError::Io { path: dir, source })?;
        }

        let mut written = vec![self.write_json(layout.config_file(), &project.config)?];
        if let Some(ref resource) = project.resource_manifest {
            written.push(self.write_json(layout.resource_manifest(), resource)?);
        }
        written.push(self.write_json(layout.package_file(), &project.package)?);
        if language == Language::Ts {
            written.push(self.write_json(TSCONFIG_FILE, &tsconfig())?);
        }
        written.push(self.write_text(language.entry_file(), DEFAULT_SCRIPT)?);
        written.push(self.write_text(MCATTRIBUTES_FILE, MCATTRIBUTES)?);
        written.push(self.write_bytes(GULPFILE, gulpfile)?);
        written.push(self.write_json(layout.behavior_manifest(), &project.behavior_manifest)?);

        info!(root = %layout.root.display(), files = written.len(), "created project");
        Ok(written)
    }

    /// Load the behavior pack manifest and `package.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::CorruptArtifact`] if either file is missing,
    /// unreadable or not valid.
    pub fn load(&self) -> Result<ProjectFiles, ArtifactError> {
        let manifest_path = self.layout.behavior_manifest();
        let text = read_artifact(&manifest_path)?;
        let manifest = ProjectManifest::parse(&text).map_err(|e| corrupt(&manifest_path, &e))?;
        let manifest_doc = Document::parse(&manifest_path, &text)?;

        let package_path = self.layout.package_file();
        let text = read_artifact(&package_path)?;
        let package = PackageDescriptor::parse(&text).map_err(|e| corrupt(&package_path, &e))?;
        let package_doc = Document::parse(&package_path, &text)?;

        Ok(ProjectFiles {
            manifest,
            package,
            manifest_doc,
            package_doc,
        })
    }

    /// Write back the files returned by [`load`](Self::load).
    ///
    /// Only the dependency tables are taken from the typed models; every
    /// other field keeps its value and position.
    ///
    /// # Errors
    ///
    /// Returns the first failed write.
    pub fn write_files(&self, files: &ProjectFiles) -> Result<(), ArtifactError> {
        let manifest_path = self.layout.behavior_manifest();
        let mut manifest_doc = files.manifest_doc.clone();
        files
            .manifest
            .merge_dependencies_into(&mut manifest_doc.fields)
            .map_err(|source| ArtifactError::Serialize {
                path: manifest_path.clone(),
                source,
            })?;
        self.write_document(manifest_path, &manifest_doc)?;

        let mut package_doc = files.package_doc.clone();
        files
            .package
            .merge_dependencies_into(&mut package_doc.fields);
        self.write_document(self.layout.package_file(), &package_doc)?;

        info!(root = %self.layout.root.display(), "updated project descriptors");
        Ok(())
    }

    /// Remove installed packages and lockfiles so the next install starts
    /// from the written `package.json`.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn invalidate_install_cache(&self, lockfiles: &[&str]) {
        let node_modules = self.layout.node_modules();
        if node_modules.exists() {
            if let Err(e) = fs::remove_dir_all(&node_modules) {
                warn!(path = %node_modules.display(), error = %e, "failed to remove installed packages");
            }
        }

        for lockfile in lockfiles {
            let path = self.layout.path(lockfile);
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed lockfile"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove lockfile"),
            }
        }
    }
}

/// The indentation unit of a pretty-printed document, two spaces if none.
fn detect_indent(text: &str) -> String {
    text.lines()
        .skip(1)
        .find_map(|line| {
            let body = line.trim_start_matches([' ', '\t']);
            let indent = &line[..line.len() - body.len()];
            (!body.is_empty() && !indent.is_empty()).then(|| indent.to_string())
        })
        .unwrap_or_else(|| "  ".to_string())
}

fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|e| corrupt(path, &e))
}

fn corrupt(path: &Path, reason: &dyn std::fmt::Display) -> ArtifactError {
    ArtifactError::CorruptArtifact {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::ManifestAssembler;
    use crate::dependency::{Dependency, VersionCoordinate};
    use crate::project::ProjectOptions;
    use crate::select::Selection;
    use tempfile::TempDir;

    fn assembled(resource_pack: bool) -> AssembledProject {
        let mut options = ProjectOptions::new("demo").unwrap();
        options.resource_pack = resource_pack;
        let selection = Selection::new(vec![Dependency::resolved(
            "@minecraft/server",
            VersionCoordinate::module("1.2.0", "1.2.0-beta"),
        )]);
        ManifestAssembler::new(&options).assemble(&selection)
    }

    #[test]
    fn test_write_json_format() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(tmp.path()));
        let path = writer
            .write_json("nested/value.json", &serde_json::json!({"a": [1]}))
            .unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}\n");
    }

    #[test]
    fn test_scaffold_typescript_project() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(tmp.path()));
        writer
            .scaffold(&assembled(true), Language::Ts, b"// gulp")
            .unwrap();

        let root = tmp.path();
        for file in [
            ".serein.json",
            "behavior_packs/manifest.json",
            "resource_packs/manifest.json",
            "package.json",
            "tsconfig.json",
            "scripts/main.ts",
            ".mcattributes",
            "gulpfile.js",
        ] {
            assert!(root.join(file).is_file(), "missing {file}");
        }
        assert!(root.join("behavior_packs/scripts").is_dir());
        assert_eq!(fs::read(root.join("gulpfile.js")).unwrap(), b"// gulp");
    }

    #[test]
    fn test_scaffold_javascript_without_resource_pack() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(tmp.path()));
        writer
            .scaffold(&assembled(false), Language::Js, b"")
            .unwrap();

        let root = tmp.path();
        assert!(root.join("scripts/main.js").is_file());
        assert!(!root.join("tsconfig.json").exists());
        assert!(!root.join("resource_packs").exists());
    }

    #[test]
    fn test_scaffold_refuses_existing_project() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(tmp.path()));
        writer.scaffold(&assembled(true), Language::Ts, b"").unwrap();
        let err = writer
            .scaffold(&assembled(true), Language::Ts, b"")
            .unwrap_err();
        assert!(matches!(err, ArtifactError::AlreadyInitialized(_)));
    }

    #[test]
    fn test_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(tmp.path()));
        let project = assembled(true);
        writer.scaffold(&project, Language::Ts, b"").unwrap();

        let files = writer.load().unwrap();
        assert_eq!(files.manifest, project.behavior_manifest);
        assert_eq!(files.package, project.package);

        writer.write_files(&files).unwrap();
        assert_eq!(writer.load().unwrap(), files);
    }

    #[test]
    fn test_load_missing_or_invalid_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(tmp.path()));
        assert!(matches!(
            writer.load(),
            Err(ArtifactError::CorruptArtifact { .. })
        ));

        fs::create_dir_all(tmp.path().join("behavior_packs")).unwrap();
        fs::write(tmp.path().join("behavior_packs/manifest.json"), "{ not json").unwrap();
        match writer.load() {
            Err(ArtifactError::CorruptArtifact { path, .. }) => {
                assert!(path.ends_with("behavior_packs/manifest.json"));
            }
            other => panic!("expected corrupt artifact, got {other:?}"),
        }
    }

    const USER_MANIFEST: &str = r#"{
  "format_version": 2,
  "header": {
    "name": "demo",
    "uuid": "11111111-1111-4111-8111-111111111111",
    "version": [
      1,
      0,
      0
    ]
  },
  "modules": [
    {
      "type": "script",
      "language": "javascript",
      "uuid": "22222222-2222-4222-8222-222222222222",
      "entry": "scripts/main.js",
      "version": [
        1,
        0,
        0
      ]
    }
  ],
  "dependencies": [
    {
      "version": "1.1.0",
      "module_name": "@minecraft/server"
    },
    {
      "module_name": "custom-lib",
      "version": "0.1.0"
    }
  ]
}
"#;

    const USER_PACKAGE: &str = r#"{
    "name": "demo",
    "private": true,
    "scripts": {
        "build": "gulp build"
    },
    "dependencies": {
        "@minecraft/server": "1.1.0-beta",
        "gulp": "^4.0.2"
    }
}
"#;

    fn user_project() -> (TempDir, ArtifactWriter) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("behavior_packs")).unwrap();
        fs::write(tmp.path().join("behavior_packs/manifest.json"), USER_MANIFEST).unwrap();
        fs::write(tmp.path().join("package.json"), USER_PACKAGE).unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(tmp.path()));
        (tmp, writer)
    }

    fn changed_lines(before: &str, after: &str) -> Vec<(String, String)> {
        assert_eq!(before.lines().count(), after.lines().count());
        before
            .lines()
            .zip(after.lines())
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_private_package_without_version_loads() {
        let (_tmp, writer) = user_project();
        let files = writer.load().unwrap();
        assert_eq!(files.package.version, None);
        assert_eq!(files.package.dependency_version("gulp"), Some("^4.0.2"));
    }

    #[test]
    fn test_unchanged_write_back_is_byte_identical() {
        let (tmp, writer) = user_project();
        let files = writer.load().unwrap();
        writer.write_files(&files).unwrap();

        let root = tmp.path();
        assert_eq!(
            fs::read_to_string(root.join("behavior_packs/manifest.json")).unwrap(),
            USER_MANIFEST
        );
        assert_eq!(fs::read_to_string(root.join("package.json")).unwrap(), USER_PACKAGE);
    }

    #[test]
    fn test_write_back_only_changes_dependency_versions() {
        let (tmp, writer) = user_project();
        let mut files = writer.load().unwrap();
        files.manifest.dependencies[0].version =
            crate::manifest::ManifestVersion::Text("1.2.0".to_string());
        files.package.set_dependency("@minecraft/server", "1.2.0-beta");
        writer.write_files(&files).unwrap();

        let root = tmp.path();
        let manifest = fs::read_to_string(root.join("behavior_packs/manifest.json")).unwrap();
        assert_eq!(
            changed_lines(USER_MANIFEST, &manifest),
            vec![(
                r#"      "version": "1.1.0","#.to_string(),
                r#"      "version": "1.2.0","#.to_string()
            )]
        );

        let package = fs::read_to_string(root.join("package.json")).unwrap();
        assert_eq!(
            changed_lines(USER_PACKAGE, &package),
            vec![(
                r#"        "@minecraft/server": "1.1.0-beta","#.to_string(),
                r#"        "@minecraft/server": "1.2.0-beta","#.to_string()
            )]
        );
    }

    #[test]
    fn test_failed_scaffold_can_be_retried() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        // A directory in place of the build script makes that write fail.
        fs::create_dir_all(root.join("gulpfile.js/blocked")).unwrap();
        let writer = ArtifactWriter::new(ProjectLayout::new(root));

        assert!(writer.scaffold(&assembled(true), Language::Ts, b"").is_err());
        assert!(!writer.layout().is_initialized());

        fs::remove_dir_all(root.join("gulpfile.js")).unwrap();
        writer.scaffold(&assembled(true), Language::Ts, b"").unwrap();
        assert!(writer.layout().is_initialized());
    }

    #[test]
    fn test_detect_indent() {
        assert_eq!(detect_indent("{\n    \"a\": 1\n}"), "    ");
        assert_eq!(detect_indent("{\n\t\"a\": 1\n}"), "\t");
        assert_eq!(detect_indent("{}"), "  ");
    }

    #[test]
    fn test_invalidate_install_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("node_modules/gulp")).unwrap();
        fs::write(root.join("package-lock.json"), "{}").unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();

        let writer = ArtifactWriter::new(ProjectLayout::new(root));
        writer.invalidate_install_cache(&["package-lock.json", "yarn.lock"]);

        assert!(!root.join("node_modules").exists());
        assert!(!root.join("package-lock.json").exists());
        assert!(root.join("package.json").exists());
    }
}
