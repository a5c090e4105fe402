//! Interactive questions asked by `init` and `switch`.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use serein_pkg::{
    parse_version, resolve_choice, validate_name, DependencyChoice, EligibleEntry, KnownPackage,
    Language, PackageKind, ProjectOptions, VersionCatalog,
};
use std::collections::BTreeMap;

/// Ask for the project metadata.
pub fn ask_project_options(default_name: &str) -> Result<ProjectOptions> {
    println!("This utility will walk you through creating a project.");
    println!("Press ^C at any time to quit.");

    let name: String = Input::new()
        .with_prompt("project name")
        .default(default_name.to_string())
        .validate_with(|input: &String| validate_name(input).map_err(|e| e.to_string()))
        .interact_text()?;

    let version: String = Input::new()
        .with_prompt("version")
        .default(serein_pkg::DEFAULT_VERSION.to_string())
        .validate_with(|input: &String| {
            parse_version(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let description: String = Input::new()
        .with_prompt("description")
        .allow_empty(true)
        .interact_text()?;

    let mut options = ProjectOptions::new(name)?.with_version(&version)?;
    options.description = description;

    options.resource_pack = Confirm::new()
        .with_prompt("Create resource_packs?")
        .default(true)
        .interact()?;

    options.allow_eval = Confirm::new()
        .with_prompt("Allow eval and new Function?")
        .default(false)
        .interact()?;

    let languages = [Language::Ts, Language::Js];
    let index = Select::new()
        .with_prompt("Language")
        .items(&languages)
        .default(0)
        .interact()?;
    options.language = languages[index];

    Ok(options)
}

/// Ask which packages to use and in which versions.
pub fn ask_dependency_choices(
    catalog: &VersionCatalog,
    packages: &[KnownPackage],
) -> Result<BTreeMap<String, DependencyChoice>> {
    println!(
        "Choose the dependencies of your project. Pick a specific version or take the latest one."
    );

    let mut choices = BTreeMap::new();
    for package in packages {
        let needed = package.mandatory
            || Confirm::new()
                .with_prompt(format!("Require {}?", package.name))
                .default(false)
                .interact()?;
        let choice = if needed {
            ask_version(catalog, package.name, package.kind)?
        } else {
            DependencyChoice::Skip
        };
        choices.insert(package.name.to_string(), choice);
    }
    Ok(choices)
}

/// Decide what to do with one eligible entry during `switch`.
pub fn ask_switch(
    catalog: &VersionCatalog,
    entry: &EligibleEntry,
) -> Result<DependencyChoice> {
    let current = match entry.current_npm {
        Some(ref npm) => format!("{} (npm {npm})", entry.current_api),
        None => entry.current_api.clone(),
    };
    let switch = Confirm::new()
        .with_prompt(format!(
            "Do you want to switch versions dependent on {}? Currently {current}",
            entry.module_name
        ))
        .default(true)
        .interact()?;

    if switch {
        ask_version(catalog, &entry.module_name, PackageKind::Module)
    } else {
        Ok(DependencyChoice::Skip)
    }
}

/// Ask for `latest` or a specific version of a package.
pub fn ask_version(
    catalog: &VersionCatalog,
    name: &str,
    kind: PackageKind,
) -> Result<DependencyChoice> {
    let listed = match kind {
        PackageKind::Module => catalog.api_versions(name),
        PackageKind::Data => catalog.data_versions(name),
    }
    .unwrap_or_default();

    let mut items = vec![latest_label(catalog, name, kind)];
    items.extend(listed.iter().map(|v| (*v).to_string()));

    let index = Select::new()
        .with_prompt(format!("Version of {name}"))
        .items(&items)
        .default(0)
        .interact()?;
    if index == 0 {
        return Ok(DependencyChoice::Latest);
    }

    let picked = listed[index - 1];
    match kind {
        PackageKind::Data => Ok(DependencyChoice::pinned_data(picked)),
        PackageKind::Module => {
            let npm_versions = catalog.npm_versions(name, picked).unwrap_or_default();
            let npm = match npm_versions.as_slice() {
                [only] => (*only).to_string(),
                _ => {
                    let index = Select::new()
                        .with_prompt(format!("npm version of {name} {picked}"))
                        .items(&npm_versions)
                        .default(0)
                        .interact()?;
                    npm_versions[index].to_string()
                }
            };
            Ok(DependencyChoice::pinned(picked, npm))
        }
    }
}

/// The label of the `latest` option, showing what it resolves to.
fn latest_label(catalog: &VersionCatalog, name: &str, kind: PackageKind) -> String {
    match resolve_choice(catalog, name, kind, &DependencyChoice::Latest) {
        Ok(dependency) => match dependency.coordinate {
            Some(coordinate) => format!("latest: {coordinate}"),
            None => "latest".to_string(),
        },
        Err(_) => "latest (not in catalog)".to_string(),
    }
}
