//! Aggregation of manifests into the final report.
//!
//! The aggregator walks every `*.deps` manifest of a checkout, turns each into
//! a `DEPENDENCIES` entry, appends the hard-coded entries, and collects every
//! name it sees into the aggregate universe that becomes `PROTO_COMPONENTS`.
//!
//! # Closure
//!
//! The universe is a closure, not a filter: every key and every dependency
//! value recorded in `DEPENDENCIES` is added to it, along with the base
//! components. Only the common runtime requirements are removed at the end,
//! since those are not `*_protos` components of the package.
//!
//! # Determinism
//!
//! Manifests are processed sorted by path and hard-coded entries sorted by key,
//! so a fixed input always yields the same [`Report`].

use crate::constants::{MANIFEST_EXTENSION, PROTODEPS_DIR, PROTOS_SUFFIX};
use crate::core::ProtodepsError;
use crate::listing::list_components;
use crate::normalize::load_manifest;
use crate::overrides::Overrides;
use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything printed by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// `DEPENDENCIES` entries in recording order: manifests first, then the
    /// hard-coded table. Value lists are unsorted and may hold duplicates.
    pub dependencies: Vec<(String, Vec<String>)>,
    /// `PROTO_COMPONENTS`: the aggregate universe minus the common requires.
    pub proto_components: BTreeSet<String>,
    /// `COMPONENTS`: the regular components of the checkout.
    pub components: BTreeSet<String>,
}

impl Report {
    /// Attach the regular component set reported by the lister.
    #[must_use]
    pub fn with_components(mut self, components: BTreeSet<String>) -> Self {
        self.components = components;
        self
    }

    /// Look up the dependency list recorded last for `component`.
    #[must_use]
    pub fn dependencies_of(&self, component: &str) -> Option<&[String]> {
        self.dependencies
            .iter()
            .rev()
            .find(|(key, _)| key == component)
            .map(|(_, deps)| deps.as_slice())
    }
}

/// Directory holding the manifests of a checkout.
#[must_use]
pub fn manifest_dir(source_folder: &Path) -> PathBuf {
    PROTODEPS_DIR.iter().fold(source_folder.to_path_buf(), |dir, part| dir.join(part))
}

/// List the `*.deps` files of `deps_dir`, sorted by path.
///
/// A missing directory yields an empty list. Like a shell glob, `*` does not
/// match a leading dot, so hidden files are ignored.
///
/// # Errors
///
/// Returns an error if the directory path is not valid UTF-8 or an entry
/// cannot be inspected.
pub fn find_manifests(deps_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = deps_dir.to_str().ok_or_else(|| ProtodepsError::Other {
        message: format!("Manifest directory is not valid UTF-8: {}", deps_dir.display()),
    })?;
    let pattern = Path::new(&Pattern::escape(dir)).join(format!("*{MANIFEST_EXTENSION}"));
    let pattern = pattern.to_string_lossy();
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut files = glob::glob_with(&pattern, options)
        .with_context(|| format!("Invalid manifest pattern {pattern}"))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to list manifests in {}", deps_dir.display()))?;
    files.sort();
    Ok(files)
}

/// Aggregate the manifests of `deps_dir` with the hard-coded tables.
///
/// For each manifest, the base name (file name without `.deps`) is renamed via
/// [`Overrides::replaced_names`]; experimental and unused names are skipped,
/// the rest become `<name>_protos` with the manifest's normalized dependency
/// list. The returned report has an empty [`Report::components`].
///
/// # Errors
///
/// Returns an error if the manifests cannot be listed or a manifest cannot be
/// read.
pub fn aggregate(
    deps_dir: &Path,
    experimental: &BTreeSet<String>,
    overrides: &Overrides,
) -> Result<Report> {
    let mut universe = overrides.base_components.clone();
    let mut dependencies = Vec::new();

    let manifests = find_manifests(deps_dir)?;
    debug!("Found {} manifests in {}", manifests.len(), deps_dir.display());

    for path in manifests {
        let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let base = file_name.replace(MANIFEST_EXTENSION, "");
        let base = overrides.replaced_names.get(&base).cloned().unwrap_or(base);
        if experimental.contains(&base) || overrides.unused.contains(&base) {
            debug!("Skipping manifest {} ({base})", path.display());
            continue;
        }

        let component = format!("{base}{PROTOS_SUFFIX}");
        let deps = load_manifest(&path, overrides)?;
        universe.insert(component.clone());
        universe.extend(deps.iter().cloned());
        dependencies.push((component, deps));
    }

    for (component, deps) in &overrides.hard_coded_dependencies {
        universe.insert(component.clone());
        universe.extend(deps.iter().cloned());
        dependencies.push((component.clone(), deps.clone()));
    }

    let proto_components: BTreeSet<String> =
        universe.difference(&overrides.common_requires).cloned().collect();
    info!(
        "Aggregated {} dependency entries and {} proto components",
        dependencies.len(),
        proto_components.len()
    );

    Ok(Report {
        dependencies,
        proto_components,
        components: BTreeSet::new(),
    })
}

/// Run the whole extraction for a checkout.
///
/// Lists the components, aggregates the manifests under
/// `external/googleapis/protodeps`, and attaches the regular components.
///
/// # Errors
///
/// Propagates any listing, manifest or I/O failure.
pub fn build_report(source_folder: &Path, overrides: &Overrides) -> Result<Report> {
    let sets = list_components(source_folder, overrides)
        .with_context(|| format!("Failed to list components in {}", source_folder.display()))?;
    let deps_dir = manifest_dir(source_folder);
    let report = aggregate(&deps_dir, &sets.experimental, overrides)
        .with_context(|| format!("Failed to aggregate manifests in {}", deps_dir.display()))?;
    Ok(report.with_components(sets.regular))
}
