//! Project initialization for `serein init`.

use crate::context::CommandContext;
use crate::{install, prompt};
use anyhow::{bail, Context, Result};
use serein_pkg::{
    sanitize_name, ArtifactWriter, CatalogClient, DependencySelector, ManifestAssembler,
    ProjectOptions, Selection, BEHAVIOR_DIR, MANIFEST_FILE,
};
use std::path::Path;

/// Initialize a project in the context's root directory.
///
/// Everything is fetched and decided before the first file is written.
pub fn init_project(ctx: &CommandContext, yes: bool) -> Result<()> {
    let layout = ctx.layout();
    if layout.is_initialized() {
        bail!(
            "Cannot initialize: `{BEHAVIOR_DIR}/{MANIFEST_FILE}` already exists in {}",
            ctx.root.display()
        );
    }

    let default_name = infer_project_name(&ctx.root);
    let options = if yes {
        ProjectOptions::new(default_name)?
    } else {
        prompt::ask_project_options(&default_name)?
    };

    let client = CatalogClient::with_config(ctx.catalog.clone())
        .context("Failed to create the registry client")?;
    println!("Getting the latest dependency versions...");
    let catalog = client
        .fetch_catalog()
        .context("Failed to fetch the version catalog")?;

    let selector = DependencySelector::new(&catalog);
    let selection = if yes {
        selector.select_defaults()
    } else {
        selector.select(&prompt::ask_dependency_choices(&catalog, selector.packages())?)
    }
    .context("Failed to resolve dependencies")?;

    println!("Downloading the gulpfile...");
    let gulpfile = client
        .fetch_template()
        .context("Failed to download the build script")?;

    let project = ManifestAssembler::new(&options).assemble(&selection);
    ArtifactWriter::new(layout)
        .scaffold(&project, options.language, &gulpfile)
        .context("Failed to create project files")?;

    println!("Created project `{}`", options.name);
    print_dependencies(&selection);

    install::install_dependencies(ctx)
}

/// Infer the project name from a directory name.
fn infer_project_name(root: &Path) -> String {
    let dir_name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    sanitize_name(dir_name)
}

fn print_dependencies(selection: &Selection) {
    for dependency in selection.active() {
        if let Some(ref coordinate) = dependency.coordinate {
            println!("  + {} {coordinate}", dependency.name);
        }
    }
}
