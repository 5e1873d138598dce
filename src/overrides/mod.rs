//! Name-rewrite and correction tables.
//!
//! The upstream manifests do not map one-to-one onto the CMake targets the
//! recipe exposes. A handful of static tables patch the difference: targets to
//! drop, targets and manifests to rename, manifests to ignore, components that
//! exist without a manifest, and edges that only live in upstream CMake code.
//!
//! The built-in tables are kept as TOML in `defaults.toml` next to this file and
//! embedded into the binary. A maintainer can replace any of them for one run
//! with `--overrides FILE`:
//!
//! ```toml
//! # Replaces only these two tables; everything else stays built-in.
//! unused = ["iam_policy", "iam_v2"]
//!
//! [replaced_targets]
//! grafeas_v1_grafeas_protos = "grafeas_protos"
//! ```

use crate::core::ProtodepsError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

const BUILTIN_TABLES: &str = include_str!("defaults.toml");

/// The full set of correction tables used by one run.
///
/// Sets and maps are ordered so every iteration over them is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overrides {
    /// Runtime libraries prepended to every manifest-derived dependency list.
    pub common_requires: BTreeSet<String>,

    /// Normalized targets with no downstream equivalent; dropped silently.
    pub removed_targets: BTreeSet<String>,

    /// Renames applied to a normalized target.
    pub replaced_targets: BTreeMap<String, String>,

    /// Renames applied to a manifest's base name before it becomes a component.
    pub replaced_names: BTreeMap<String, String>,

    /// Manifest base names skipped entirely.
    pub unused: BTreeSet<String>,

    /// Components known to exist without a matching manifest.
    pub base_components: BTreeSet<String>,

    /// Edges not represented by any manifest.
    ///
    /// Values keep their configured order and duplicates.
    pub hard_coded_dependencies: BTreeMap<String, Vec<String>>,

    /// GA components assumed when the checkout has no listing file.
    pub default_components: BTreeSet<String>,

    /// Experimental components assumed when the checkout has no listing file.
    pub default_experimental_components: BTreeSet<String>,
}

/// A partial set of tables read from an overrides file.
///
/// Present tables replace the built-in table of the same name wholesale.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverridesFile {
    common_requires: Option<BTreeSet<String>>,
    removed_targets: Option<BTreeSet<String>>,
    replaced_targets: Option<BTreeMap<String, String>>,
    replaced_names: Option<BTreeMap<String, String>>,
    unused: Option<BTreeSet<String>>,
    base_components: Option<BTreeSet<String>>,
    hard_coded_dependencies: Option<BTreeMap<String, Vec<String>>>,
    default_components: Option<BTreeSet<String>>,
    default_experimental_components: Option<BTreeSet<String>>,
}

impl Overrides {
    /// Parse the tables compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded `defaults.toml` is malformed.
    pub fn builtin() -> Result<Self> {
        toml::from_str(BUILTIN_TABLES)
            .map_err(ProtodepsError::from)
            .context("Failed to parse built-in override tables")
    }

    /// Load the tables for a run.
    ///
    /// Starts from [`Overrides::builtin`] and, when `path` is given, replaces
    /// every table present in that file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The overrides file cannot be read
    /// - The file is not valid TOML or contains unknown tables
    /// - A table contains an empty component name
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let builtin = Self::builtin()?;
        let Some(path) = path else {
            return Ok(builtin);
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read overrides from {}", path.display()))?;
        let file: OverridesFile = toml::from_str(&content)
            .map_err(ProtodepsError::from)
            .with_context(|| format!("Failed to parse overrides from {}", path.display()))?;

        let merged = builtin.merge(file);
        merged.validate().map_err(|reason| ProtodepsError::InvalidOverrides {
            file: path.display().to_string(),
            reason,
        })?;
        debug!("Loaded override tables from {}", path.display());
        Ok(merged)
    }

    fn merge(self, file: OverridesFile) -> Self {
        Self {
            common_requires: file.common_requires.unwrap_or(self.common_requires),
            removed_targets: file.removed_targets.unwrap_or(self.removed_targets),
            replaced_targets: file.replaced_targets.unwrap_or(self.replaced_targets),
            replaced_names: file.replaced_names.unwrap_or(self.replaced_names),
            unused: file.unused.unwrap_or(self.unused),
            base_components: file.base_components.unwrap_or(self.base_components),
            hard_coded_dependencies: file
                .hard_coded_dependencies
                .unwrap_or(self.hard_coded_dependencies),
            default_components: file.default_components.unwrap_or(self.default_components),
            default_experimental_components: file
                .default_experimental_components
                .unwrap_or(self.default_experimental_components),
        }
    }

    /// Reject tables containing empty names.
    ///
    /// An empty key would silently match the empty string produced by a
    /// blank manifest line.
    fn validate(&self) -> std::result::Result<(), String> {
        let sets = [
            ("common_requires", &self.common_requires),
            ("removed_targets", &self.removed_targets),
            ("unused", &self.unused),
            ("base_components", &self.base_components),
            ("default_components", &self.default_components),
            ("default_experimental_components", &self.default_experimental_components),
        ];
        for (table, set) in sets {
            if set.iter().any(String::is_empty) {
                return Err(format!("table '{table}' contains an empty name"));
            }
        }

        for (table, map) in [
            ("replaced_targets", &self.replaced_targets),
            ("replaced_names", &self.replaced_names),
        ] {
            if map.iter().any(|(from, to)| from.is_empty() || to.is_empty()) {
                return Err(format!("table '{table}' contains an empty name"));
            }
        }

        for (component, deps) in &self.hard_coded_dependencies {
            if component.is_empty() || deps.iter().any(String::is_empty) {
                return Err("table 'hard_coded_dependencies' contains an empty name".to_string());
            }
        }
        Ok(())
    }
}
