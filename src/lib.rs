//! protodeps - google-cloud-cpp proto dependency extractor
//!
//! google-cloud-cpp builds roughly a hundred libraries from proto files, and
//! those libraries depend on each other. The upstream Bazel build records the
//! edges in small generated `*.deps` manifests, one per proto library. A Conan
//! recipe cannot read those files (nor the `*-config.cmake` files the package
//! installs), so the graph is reconstructed once, offline, and checked into the
//! recipe as a static Python table.
//!
//! # Pipeline
//!
//! The whole program is a single batch transformation:
//!
//! ```text
//! libraries.bzl ──► listing ──────────────┐
//!                                         ▼
//! protodeps/*.deps ──► normalize ──► aggregate ──► emit ──► stdout
//!                                         ▲
//! overrides (built-in or --overrides) ────┘
//! ```
//!
//! - [`listing`] - GA/transition and experimental component sets, parsed from
//!   `libraries.bzl` or taken from built-in defaults
//! - [`normalize`] - rewrites raw Bazel labels into downstream component names
//! - [`aggregate`] - merges manifests, hard-coded edges and base components
//! - [`emit`] - prints the report as Python literals
//!
//! # Supporting Modules
//!
//! - [`cli`] - command-line parsing and logging setup
//! - [`core`] - error types and user-facing error reporting
//! - [`overrides`] - the name-rewrite and correction tables
//! - [`constants`] - file names and label markers used across modules
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Regenerate the recipe's dependency table
//! protodeps --source-folder ~/src/google-cloud-cpp > components_2_5_0.py
//!
//! # Same, with a locally corrected set of tables
//! protodeps -s ~/src/google-cloud-cpp --overrides fixes.toml
//! ```

pub mod aggregate;
pub mod cli;
pub mod constants;
pub mod core;
pub mod emit;
pub mod listing;
pub mod normalize;
pub mod overrides;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
