//! Per-invocation settings shared by all commands.

use anyhow::{bail, Result};
use clap::ValueEnum;
use serein_pkg::{CatalogConfig, ProjectLayout, BEHAVIOR_DIR, MANIFEST_FILE};
use std::fmt;
use std::path::{Path, PathBuf};

/// The package manager that installs the project's npm dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    /// Pick the package manager whose lockfile exists in `root`, npm if none.
    pub fn detect(root: &Path) -> Self {
        [Self::Pnpm, Self::Yarn]
            .into_iter()
            .find(|pm| root.join(pm.lockfile()).is_file())
            .unwrap_or(Self::Npm)
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }

    pub fn lockfile(self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Yarn => "yarn.lock",
        }
    }

    pub fn install_command(self) -> ToolCommand {
        ToolCommand::new(self.program(), &["install"])
    }

    /// The command that runs a gulp task through this package manager.
    pub fn gulp_command(self, task: GulpTask) -> ToolCommand {
        let mut command = match self {
            Self::Npm => ToolCommand::new("npx", &["gulp"]),
            Self::Pnpm => ToolCommand::new("pnpm", &["exec", "gulp"]),
            Self::Yarn => ToolCommand::new("yarn", &["gulp"]),
        };
        command.args.extend_from_slice(task.args());
        command
    }
}

/// Tasks defined by the project's gulpfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GulpTask {
    Build,
    Deploy,
    Pack,
    Watch,
}

impl GulpTask {
    fn args(self) -> &'static [&'static str] {
        match self {
            Self::Build => &["build"],
            Self::Deploy => &[],
            Self::Pack => &["bundle"],
            Self::Watch => &["watch"],
        }
    }
}

/// An external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: &'static str,
    pub args: Vec<&'static str>,
}

impl ToolCommand {
    fn new(program: &'static str, args: &[&'static str]) -> Self {
        Self {
            program,
            args: args.to_vec(),
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Settings threaded through every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root directory.
    pub root: PathBuf,
    /// Package manager used for installs and tasks.
    pub package_manager: PackageManager,
    /// Skip the install step after writing `package.json`.
    pub skip_install: bool,
    /// Where to fetch the catalog and build script from.
    pub catalog: CatalogConfig,
}

impl CommandContext {
    /// Context for a project rooted at `root`.
    pub fn new(
        root: PathBuf,
        package_manager: Option<PackageManager>,
        skip_install: bool,
        catalog: CatalogConfig,
    ) -> Self {
        let package_manager = package_manager.unwrap_or_else(|| PackageManager::detect(&root));
        Self {
            root,
            package_manager,
            skip_install,
            catalog,
        }
    }

    /// Context for the existing project containing `start`.
    pub fn for_project(
        start: &Path,
        package_manager: Option<PackageManager>,
        skip_install: bool,
        catalog: CatalogConfig,
    ) -> Result<Self> {
        let Some(layout) = ProjectLayout::find_root(start) else {
            bail!(
                "No {BEHAVIOR_DIR}/{MANIFEST_FILE} found in {} or any parent directory. Run `serein init` first.",
                start.display()
            );
        };
        Ok(Self::new(layout.root, package_manager, skip_install, catalog))
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.root)
    }
}
