//! Project structure and file locations.
//!
//! A Serein project has this conventional layout:
//! ```text
//! my-addon/
//! ├── .serein.json                 # Project configuration
//! ├── package.json                 # npm package descriptor
//! ├── gulpfile.js                  # Build script
//! ├── tsconfig.json                # TypeScript projects only
//! ├── scripts/main.ts              # Script entry point (main.js for JavaScript)
//! ├── behavior_packs/
//! │   ├── manifest.json            # Behavior pack manifest
//! │   └── scripts/                 # Build output
//! └── resource_packs/              # Optional
//!     └── manifest.json
//! ```

use std::path::{Path, PathBuf};

/// Project configuration file.
pub const CONFIG_FILE: &str = ".serein.json";

/// npm package descriptor.
pub const PACKAGE_FILE: &str = "package.json";

/// Behavior pack directory.
pub const BEHAVIOR_DIR: &str = "behavior_packs";

/// Resource pack directory.
pub const RESOURCE_DIR: &str = "resource_packs";

/// Manifest filename inside a pack directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Script sources directory.
pub const SCRIPTS_DIR: &str = "scripts";

/// Build script written from the downloaded template.
pub const GULPFILE: &str = "gulpfile.js";

/// TypeScript compiler configuration.
pub const TSCONFIG_FILE: &str = "tsconfig.json";

/// Editor diagnostics configuration.
pub const MCATTRIBUTES_FILE: &str = ".mcattributes";

/// Installed npm packages.
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Paths of a project rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Root directory of the project.
    pub root: PathBuf,
}

impl ProjectLayout {
    /// Layout of a project at `root` (which need not exist yet).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find a project by searching upward from `start` for a behavior pack
    /// manifest.
    #[must_use]
    pub fn find_root(start: impl AsRef<Path>) -> Option<Self> {
        start
            .as_ref()
            .ancestors()
            .find(|dir| dir.join(BEHAVIOR_DIR).join(MANIFEST_FILE).is_file())
            .map(Self::new)
    }

    /// Returns true if a behavior pack manifest already exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.behavior_manifest().exists()
    }

    #[must_use]
    pub fn behavior_dir(&self) -> PathBuf {
        self.root.join(BEHAVIOR_DIR)
    }

    #[must_use]
    pub fn resource_dir(&self) -> PathBuf {
        self.root.join(RESOURCE_DIR)
    }

    #[must_use]
    pub fn behavior_manifest(&self) -> PathBuf {
        self.behavior_dir().join(MANIFEST_FILE)
    }

    #[must_use]
    pub fn resource_manifest(&self) -> PathBuf {
        self.resource_dir().join(MANIFEST_FILE)
    }

    #[must_use]
    pub fn package_file(&self) -> PathBuf {
        self.root.join(PACKAGE_FILE)
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(SCRIPTS_DIR)
    }

    #[must_use]
    pub fn node_modules(&self) -> PathBuf {
        self.root.join(NODE_MODULES_DIR)
    }

    /// Resolve a path relative to the project root.
    #[must_use]
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
