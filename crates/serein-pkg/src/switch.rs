//! Selective re-resolution of the dependencies of an existing project.
//!
//! Each manifest dependency entry moves through these states:
//!
//! ```text
//! Unexamined ──(module_name matches the vendor pattern)──> Eligible
//! Eligible ──(Skip)──────────────────────────────────────> Skipped
//! Eligible ──(Latest | Pinned, resolves)─────────────────> Resolved
//! Eligible ──(Latest | Pinned, fails)────────────────────> Failed
//! ```
//!
//! Entries that never become eligible (pack references by uuid, custom
//! modules) are left exactly as loaded. Nothing is removed or reordered.

use crate::catalog::VersionCatalog;
use crate::dependency::{resolve_choice, DependencyChoice, PackageKind, ResolveError};
use crate::descriptor::PackageDescriptor;
use crate::manifest::{ManifestDependency, ManifestVersion, ProjectManifest};
use regex::Regex;
use std::convert::Infallible;
use tracing::{debug, warn};

/// Module names matching this pattern are resolved against the catalog.
pub const VENDOR_PATTERN: &str = "@minecraft";

/// A manifest entry that may be switched to another version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleEntry {
    /// Position in the manifest dependency list.
    pub index: usize,
    /// Script module name.
    pub module_name: String,
    /// Version currently in the manifest.
    pub current_api: String,
    /// Version currently in `package.json`, if listed there.
    pub current_npm: Option<String>,
}

/// Final state of one manifest dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Not matched by the vendor pattern; untouched.
    Unexamined,
    /// Matched, but the caller chose to keep it.
    Skipped,
    /// Rewritten to new versions.
    Resolved { api: String, npm: String },
    /// Matched, but could not be resolved; untouched.
    Failed(ResolveError),
}

/// Outcome for one manifest dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub index: usize,
    pub module_name: Option<String>,
    /// Manifest version before switching.
    pub previous: String,
    pub state: EntryState,
}

/// Outcome of a switch over the whole manifest, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchReport {
    pub entries: Vec<EntryOutcome>,
}

impl SwitchReport {
    /// Entries that were rewritten.
    pub fn resolved(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, EntryState::Resolved { .. }))
    }

    /// Entries that could not be resolved, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&EntryOutcome, &ResolveError)> {
        self.entries.iter().filter_map(|e| match e.state {
            EntryState::Failed(ref err) => Some((e, err)),
            _ => None,
        })
    }

    /// Returns true if any entry failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Re-resolves the eligible dependencies of a loaded project.
#[derive(Debug, Clone)]
pub struct SwitchResolver<'a> {
    catalog: &'a VersionCatalog,
    pattern: Regex,
}

impl<'a> SwitchResolver<'a> {
    /// A resolver matching module names against [`VENDOR_PATTERN`].
    #[must_use]
    pub fn new(catalog: &'a VersionCatalog) -> Self {
        Self {
            catalog,
            pattern: Regex::new(&regex::escape(VENDOR_PATTERN))
                .expect("escaped literal is a valid regex"),
        }
    }

    /// A resolver with a custom eligibility pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn with_pattern(catalog: &'a VersionCatalog, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            catalog,
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns true if the entry is a module matched by the pattern.
    #[must_use]
    pub fn is_eligible(&self, entry: &ManifestDependency) -> bool {
        entry
            .module_name
            .as_deref()
            .is_some_and(|name| self.pattern.is_match(name))
    }

    /// The entries a switch would consider, in manifest order.
    #[must_use]
    pub fn eligible_entries(
        &self,
        manifest: &ProjectManifest,
        package: &PackageDescriptor,
    ) -> Vec<EligibleEntry> {
        manifest
            .dependencies
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.is_eligible(entry))
            .filter_map(|(index, entry)| {
                let module_name = entry.module_name.clone()?;
                let current_npm = package.dependency_version(&module_name).map(String::from);
                Some(EligibleEntry {
                    index,
                    current_api: entry.version.to_string(),
                    current_npm,
                    module_name,
                })
            })
            .collect()
    }

    /// Switch eligible entries according to `decide`.
    ///
    /// `decide` is called once per eligible entry, in manifest order. A
    /// resolved entry has its manifest version and its `package.json` entry
    /// overwritten in place. Entries that fail to resolve are reported and
    /// left untouched; the remaining entries are still processed.
    ///
    /// # Errors
    ///
    /// Only errors returned by `decide` abort the switch.
    pub fn resolve<F, E>(
        &self,
        manifest: &mut ProjectManifest,
        package: &mut PackageDescriptor,
        mut decide: F,
    ) -> Result<SwitchReport, E>
    where
        F: FnMut(&EligibleEntry) -> Result<DependencyChoice, E>,
    {
        let eligible = self.eligible_entries(manifest, package);
        let mut report = SwitchReport {
            entries: manifest
                .dependencies
                .iter()
                .enumerate()
                .map(|(index, entry)| EntryOutcome {
                    index,
                    module_name: entry.module_name.clone(),
                    previous: entry.version.to_string(),
                    state: EntryState::Unexamined,
                })
                .collect(),
        };

        for entry in &eligible {
            let choice = decide(entry)?;
            let state = self.apply(entry, &choice, manifest, package);
            report.entries[entry.index].state = state;
        }

        Ok(report)
    }

    /// Switch every eligible entry to its latest catalog versions.
    pub fn resolve_latest(
        &self,
        manifest: &mut ProjectManifest,
        package: &mut PackageDescriptor,
    ) -> SwitchReport {
        let result: Result<SwitchReport, Infallible> =
            self.resolve(manifest, package, |_| Ok(DependencyChoice::Latest));
        match result {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    fn apply(
        &self,
        entry: &EligibleEntry,
        choice: &DependencyChoice,
        manifest: &mut ProjectManifest,
        package: &mut PackageDescriptor,
    ) -> EntryState {
        if *choice == DependencyChoice::Skip {
            debug!(module = %entry.module_name, "keeping current version");
            return EntryState::Skipped;
        }

        let dependency =
            match resolve_choice(self.catalog, &entry.module_name, PackageKind::Module, choice) {
                Ok(dependency) => dependency,
                Err(err) => {
                    warn!(module = %entry.module_name, error = %err, "cannot switch dependency");
                    return EntryState::Failed(err);
                }
            };

        let Some((api, npm)) = dependency
            .coordinate
            .and_then(|c| c.api.map(|api| (api, c.npm)))
        else {
            return EntryState::Failed(ResolveError::InvalidCoordinate {
                name: entry.module_name.clone(),
                reason: "a manifest module needs an api version".to_string(),
            });
        };

        manifest.dependencies[entry.index].version = ManifestVersion::Text(api.clone());
        package.set_dependency(entry.module_name.clone(), npm.clone());
        debug!(module = %entry.module_name, %api, %npm, "switched dependency");

        EntryState::Resolved { api, npm }
    }
}
