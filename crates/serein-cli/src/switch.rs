//! Implementation of the `serein switch` command.

use crate::context::CommandContext;
use crate::{install, prompt};
use anyhow::{Context, Result};
use serein_pkg::{ArtifactWriter, CatalogClient, EntryState, SwitchReport, SwitchResolver};

/// Switch the versions of the project's eligible dependencies.
///
/// With `yes`, every eligible dependency moves to its latest version without
/// asking. Descriptors are only written once every decision has been made.
pub fn switch_versions(ctx: &CommandContext, yes: bool) -> Result<()> {
    let writer = ArtifactWriter::new(ctx.layout());
    let mut files = writer.load().context("Failed to load the project")?;

    let client = CatalogClient::with_config(ctx.catalog.clone())
        .context("Failed to create the registry client")?;
    println!("Getting the latest dependency versions...");
    let catalog = client
        .fetch_catalog()
        .context("Failed to fetch the version catalog")?;

    let resolver = SwitchResolver::new(&catalog);
    let report = if yes {
        resolver.resolve_latest(&mut files.manifest, &mut files.package)
    } else {
        resolver.resolve(&mut files.manifest, &mut files.package, |entry| {
            prompt::ask_switch(&catalog, entry)
        })?
    };

    print_summary(&report);
    if report.resolved().next().is_none() {
        return Ok(());
    }

    writer
        .write_files(&files)
        .context("Failed to write the project descriptors")?;
    writer.invalidate_install_cache(&[ctx.package_manager.lockfile()]);

    install::install_dependencies(ctx)
}

/// Print one line per examined dependency.
fn print_summary(report: &SwitchReport) {
    let mut examined = false;
    for entry in &report.entries {
        let name = entry.module_name.as_deref().unwrap_or_default();
        match entry.state {
            EntryState::Unexamined => continue,
            EntryState::Skipped => println!("  {name} kept at {}", entry.previous),
            EntryState::Resolved { ref api, ref npm } => {
                println!("  {name} {} -> {api} (npm {npm})", entry.previous);
            }
            EntryState::Failed(ref err) => println!("  {name} not switched: {err}"),
        }
        examined = true;
    }

    if !examined {
        println!("No @minecraft dependencies to switch.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PackageManager;
    use serein_pkg::{CatalogConfig, BEHAVIOR_DIR, MANIFEST_FILE};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_corrupt_manifest_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(BEHAVIOR_DIR)).unwrap();
        let manifest = tmp.path().join(BEHAVIOR_DIR).join(MANIFEST_FILE);
        fs::write(&manifest, "{ broken").unwrap();
        fs::write(tmp.path().join("package.json"), r#"{"name": "a", "version": "1.0.0"}"#)
            .unwrap();

        let ctx = CommandContext::new(
            tmp.path().to_path_buf(),
            Some(PackageManager::Npm),
            true,
            CatalogConfig::with_registry("http://127.0.0.1:9"),
        );
        let err = switch_versions(&ctx, true).unwrap_err();
        assert!(format!("{err:#}").contains("manifest.json"));
        assert_eq!(fs::read_to_string(&manifest).unwrap(), "{ broken");
    }
}
