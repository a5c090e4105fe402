//! Implementation of the `serein remove` command.

use crate::context::CommandContext;
use crate::install;
use anyhow::{Context, Result};
use serein_pkg::ArtifactWriter;

/// Remove a dependency from the manifest and `package.json`.
pub fn remove_dependency(ctx: &CommandContext, package: &str) -> Result<()> {
    let writer = ArtifactWriter::new(ctx.layout());
    let mut files = writer.load().context("Failed to load the project")?;

    serein_pkg::remove_dependency(&mut files.manifest, &mut files.package, package)
        .with_context(|| format!("Failed to remove `{package}`"))?;

    writer
        .write_files(&files)
        .context("Failed to write the project descriptors")?;
    writer.invalidate_install_cache(&[ctx.package_manager.lockfile()]);
    println!("Removed {package}");

    install::install_dependencies(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PackageManager;
    use serein_pkg::{CatalogConfig, SERVER_PACKAGE};
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "format_version": 2,
  "header": {"name": "demo", "description": "", "uuid": "h", "version": [1, 0, 0]},
  "modules": [],
  "dependencies": [
    {"module_name": "@minecraft/server", "version": "1.2.0"},
    {"module_name": "@minecraft/server-ui", "version": "1.0.0"}
  ]
}
"#;

    const PACKAGE: &str = r#"{
  "name": "demo",
  "version": "1.0.0",
  "dependencies": {
    "@minecraft/server": "1.2.0-beta",
    "@minecraft/server-ui": "1.0.0-beta"
  }
}
"#;

    fn project() -> (TempDir, CommandContext) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("behavior_packs")).unwrap();
        fs::write(tmp.path().join("behavior_packs/manifest.json"), MANIFEST).unwrap();
        fs::write(tmp.path().join("package.json"), PACKAGE).unwrap();
        fs::write(tmp.path().join("package-lock.json"), "{}").unwrap();
        let ctx = CommandContext::new(
            tmp.path().to_path_buf(),
            Some(PackageManager::Npm),
            true,
            CatalogConfig::with_registry("http://127.0.0.1:9"),
        );
        (tmp, ctx)
    }

    #[test]
    fn test_remove_rewrites_both_files() {
        let (tmp, ctx) = project();
        remove_dependency(&ctx, "@minecraft/server-ui").unwrap();

        let manifest = fs::read_to_string(tmp.path().join("behavior_packs/manifest.json")).unwrap();
        let package = fs::read_to_string(tmp.path().join("package.json")).unwrap();
        assert!(!manifest.contains("server-ui"));
        assert!(!package.contains("server-ui"));
        assert!(!tmp.path().join("package-lock.json").exists());
    }

    #[test]
    fn test_remove_server_leaves_files_untouched() {
        let (tmp, ctx) = project();
        assert!(remove_dependency(&ctx, SERVER_PACKAGE).is_err());
        assert_eq!(
            fs::read_to_string(tmp.path().join("behavior_packs/manifest.json")).unwrap(),
            MANIFEST
        );
        assert!(tmp.path().join("package-lock.json").exists());
    }
}
