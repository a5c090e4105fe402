//! Turning user decisions into a resolved dependency set.

use crate::catalog::VersionCatalog;
use crate::dependency::{
    resolve_choice, Dependency, DependencyChoice, KnownPackage, ResolveError, KNOWN_PACKAGES,
};
use std::collections::BTreeMap;
use tracing::debug;

/// The resolved dependencies of a project, one per known package, in the
/// order of the package table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    dependencies: Vec<Dependency>,
}

impl Selection {
    /// Build a selection from resolved dependencies, keeping their order.
    #[must_use]
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self { dependencies }
    }

    /// Get a dependency by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    /// Iterate over all dependencies, used or not.
    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    /// Iterate over the dependencies the project uses.
    pub fn active(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.need)
    }

    /// Number of dependencies (used or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Returns true if the selection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Resolves per-package choices into a [`Selection`].
#[derive(Debug, Clone, Copy)]
pub struct DependencySelector<'a> {
    catalog: &'a VersionCatalog,
    packages: &'a [KnownPackage],
}

impl<'a> DependencySelector<'a> {
    /// Create a selector over the default package table.
    #[must_use]
    pub fn new(catalog: &'a VersionCatalog) -> Self {
        Self {
            catalog,
            packages: KNOWN_PACKAGES,
        }
    }

    /// The package table this selector offers.
    #[must_use]
    pub fn packages(&self) -> &'a [KnownPackage] {
        self.packages
    }

    /// Resolve the given choices.
    ///
    /// Packages without an entry in `choices` are not used, except mandatory
    /// packages which always resolve (to the latest version unless pinned).
    ///
    /// # Errors
    ///
    /// Fails on the first choice that cannot be resolved, or if `choices`
    /// names a package outside the table.
    pub fn select(
        &self,
        choices: &BTreeMap<String, DependencyChoice>,
    ) -> Result<Selection, ResolveError> {
        if let Some(stray) = choices
            .keys()
            .find(|name| !self.packages.iter().any(|p| p.name == name.as_str()))
        {
            return Err(ResolveError::UnknownDependency {
                name: stray.clone(),
            });
        }

        let latest = DependencyChoice::Latest;
        let skip = DependencyChoice::Skip;
        let mut dependencies = Vec::with_capacity(self.packages.len());
        for package in self.packages {
            let choice = match choices.get(package.name) {
                Some(DependencyChoice::Skip) | None if package.mandatory => &latest,
                Some(choice) => choice,
                None => &skip,
            };
            dependencies.push(resolve_choice(
                self.catalog,
                package.name,
                package.kind,
                choice,
            )?);
        }

        debug!(
            active = dependencies.iter().filter(|d| d.need).count(),
            "dependency selection resolved"
        );
        Ok(Selection::new(dependencies))
    }

    /// Resolve without asking: optional packages are unused and mandatory
    /// packages take their latest versions.
    ///
    /// # Errors
    ///
    /// Fails if a mandatory package is missing from the catalog.
    pub fn select_defaults(&self) -> Result<Selection, ResolveError> {
        self.select(&BTreeMap::new())
    }
}
