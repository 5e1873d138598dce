//! Test utilities for protodeps
//!
//! Helpers shared by unit tests and the integration suite (enable the
//! `test-utils` feature to use them outside this crate):
//! - [`init_test_logging`] for opt-in tracing output in tests
//! - [`SourceTreeFixture`] for a throwaway google-cloud-cpp checkout
//!
//! # Example
//!
//! ```rust,no_run
//! use protodeps_cli::test_utils::SourceTreeFixture;
//!
//! let fixture = SourceTreeFixture::new().unwrap();
//! fixture.write_manifest("iam_v1_iam_policy", "@com_google_googleapis//google/type:expr_proto\n").unwrap();
//! assert!(fixture.deps_dir().join("iam_v1_iam_policy.deps").exists());
//! ```

use crate::aggregate::manifest_dir;
use crate::constants::{LIBRARIES_FILE, MANIFEST_EXTENSION};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG` when set; with neither, tests
/// run without a subscriber.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A temporary google-cloud-cpp source checkout.
///
/// Only the files protodeps reads are created: `libraries.bzl` on demand and
/// `external/googleapis/protodeps/*.deps`. The directory is removed on drop.
pub struct SourceTreeFixture {
    temp_dir: TempDir,
}

impl SourceTreeFixture {
    /// Create an empty checkout with no listing file and no manifest directory.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary source folder")?;
        Ok(Self {
            temp_dir,
        })
    }

    /// Root of the checkout, as passed to `--source-folder`.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory holding the `*.deps` manifests.
    #[must_use]
    pub fn deps_dir(&self) -> PathBuf {
        manifest_dir(self.path())
    }

    /// Write `libraries.bzl` at the root of the checkout.
    pub fn write_libraries(&self, content: &str) -> Result<PathBuf> {
        let path = self.path().join(LIBRARIES_FILE);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write `<name>.deps` into the manifest directory, creating it if needed.
    pub fn write_manifest(&self, name: &str, content: &str) -> Result<PathBuf> {
        let dir = self.deps_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(format!("{name}{MANIFEST_EXTENSION}"));
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a manifest whose lines are the given Bazel labels.
    pub fn write_manifest_labels(&self, name: &str, labels: &[&str]) -> Result<PathBuf> {
        let mut content = labels.join("\n");
        content.push('\n');
        self.write_manifest(name, &content)
    }
}
