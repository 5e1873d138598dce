//! Component listing for a google-cloud-cpp checkout.
//!
//! The recipe only packages GA components (including ones that recently
//! "transitioned" out of experimental). Experimental components also ship a
//! `*_protos` library whose manifest has to be skipped, so the aggregator needs
//! both sets.
//!
//! Newer checkouts list the components in `libraries.bzl`; older ones do not,
//! in which case the hand-maintained defaults from the override tables are
//! used. The defaults only approximate upstream and may go stale.

pub mod parser;

use crate::constants::{
    EXPERIMENTAL_LIBRARIES_VAR, GA_LIBRARIES_VAR, LIBRARIES_FILE, TRANSITION_LIBRARIES_VAR,
};
use crate::core::ProtodepsError;
use crate::overrides::Overrides;
use anyhow::{Context, Result};
use parser::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Component names known for one checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSets {
    /// GA and transition components; printed as `COMPONENTS`.
    pub regular: BTreeSet<String>,
    /// Experimental components; their manifests are skipped.
    pub experimental: BTreeSet<String>,
}

/// Determine the regular and experimental components of a checkout.
///
/// Reads `<source_folder>/libraries.bzl` when it exists, otherwise returns
/// [`Overrides::default_components`] and
/// [`Overrides::default_experimental_components`].
///
/// # Errors
///
/// Returns an error if the listing file exists but cannot be read, uses syntax
/// outside the supported subset, or lacks one of the three library lists.
pub fn list_components(source_folder: &Path, overrides: &Overrides) -> Result<ComponentSets> {
    let libraries = source_folder.join(LIBRARIES_FILE);
    if !libraries.exists() {
        info!(
            "No {} in {}, using built-in component lists",
            LIBRARIES_FILE,
            source_folder.display()
        );
        return Ok(ComponentSets {
            regular: overrides.default_components.clone(),
            experimental: overrides.default_experimental_components.clone(),
        });
    }

    let file = libraries.display().to_string();
    let content = fs::read_to_string(&libraries)
        .map_err(ProtodepsError::from)
        .with_context(|| format!("Failed to read listing file {file}"))?;
    let bindings = parser::parse(&content, &file)?;

    let mut regular = string_set(&bindings, GA_LIBRARIES_VAR, &file)?;
    regular.extend(string_set(&bindings, TRANSITION_LIBRARIES_VAR, &file)?);
    let experimental = string_set(&bindings, EXPERIMENTAL_LIBRARIES_VAR, &file)?;

    debug!(
        "Listed {} regular and {} experimental components from {}",
        regular.len(),
        experimental.len(),
        file
    );
    Ok(ComponentSets {
        regular,
        experimental,
    })
}

fn string_set(
    bindings: &BTreeMap<String, Value>,
    name: &str,
    file: &str,
) -> Result<BTreeSet<String>, ProtodepsError> {
    let value = bindings.get(name).ok_or_else(|| ProtodepsError::MissingListingVariable {
        file: file.to_string(),
        name: name.to_string(),
    })?;
    let items = value.as_string_list().ok_or_else(|| ProtodepsError::InvalidListingVariable {
        file: file.to_string(),
        name: name.to_string(),
        found: value.type_name().to_string(),
    })?;
    Ok(items.into_iter().map(str::to_string).collect())
}
