//! Implementation of the `serein add` command.

use crate::context::CommandContext;
use crate::install;
use anyhow::{bail, Context, Result};
use serein_pkg::{ArtifactWriter, CatalogClient, DependencyChoice};

/// Add a dependency to the project, or change the version of one it already
/// has.
///
/// Without versions the latest published ones are used. `--npm` alone pins
/// a data-only package.
pub fn add_dependency(
    ctx: &CommandContext,
    package: &str,
    api: Option<String>,
    npm: Option<String>,
) -> Result<()> {
    let choice = choice_from_args(api, npm)?;

    let writer = ArtifactWriter::new(ctx.layout());
    let mut files = writer.load().context("Failed to load the project")?;

    let client = CatalogClient::with_config(ctx.catalog.clone())
        .context("Failed to create the registry client")?;
    let catalog = client
        .fetch_catalog()
        .context("Failed to fetch the version catalog")?;

    let dependency = serein_pkg::add_dependency(
        &mut files.manifest,
        &mut files.package,
        &catalog,
        package,
        choice,
    )
    .with_context(|| format!("Failed to add `{package}`"))?;

    writer
        .write_files(&files)
        .context("Failed to write the project descriptors")?;
    writer.invalidate_install_cache(&[ctx.package_manager.lockfile()]);

    if let Some(ref coordinate) = dependency.coordinate {
        println!("Added {package} {coordinate}");
    }

    install::install_dependencies(ctx)
}

fn choice_from_args(api: Option<String>, npm: Option<String>) -> Result<DependencyChoice> {
    match (api, npm) {
        (None, None) => Ok(DependencyChoice::Latest),
        (api, Some(npm)) => Ok(DependencyChoice::Pinned { api, npm }),
        (Some(_), None) => bail!("`--api` requires `--npm`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_from_args() {
        assert_eq!(choice_from_args(None, None).unwrap(), DependencyChoice::Latest);
        assert_eq!(
            choice_from_args(Some("1.2.0".into()), Some("1.2.0-beta".into())).unwrap(),
            DependencyChoice::pinned("1.2.0", "1.2.0-beta")
        );
        assert_eq!(
            choice_from_args(None, Some("1.20.10".into())).unwrap(),
            DependencyChoice::pinned_data("1.20.10")
        );
        assert!(choice_from_args(Some("1.2.0".into()), None).is_err());
    }
}
