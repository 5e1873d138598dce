//! Command-line interface for protodeps.
//!
//! The tool has a single mode of operation: point it at an extracted
//! google-cloud-cpp source tree and it prints the recipe's dependency tables
//! on stdout. Diagnostics and logs go to stderr so the output can be
//! redirected straight into the recipe.
//!
//! # Examples
//!
//! ```bash
//! # Regenerate the table for a new upstream release
//! protodeps --source-folder ~/src/google-cloud-cpp-2.5.0 > components_2_5_0.py
//!
//! # See which manifests were skipped and why
//! protodeps -v -s ~/src/google-cloud-cpp-2.5.0 > /dev/null
//!
//! # Try corrected tables without rebuilding
//! protodeps -s ~/src/google-cloud-cpp-2.5.0 --overrides fixes.toml
//! ```


use crate::aggregate::build_report;
use crate::emit::write_report;
use crate::overrides::Overrides;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the command-line flags.
///
/// Kept separate from [`Cli`] so tests can build one without parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive forced by `--verbose` or `--quiet`.
    ///
    /// When `None`, `RUST_LOG` is honored, falling back to `warn`.
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Create a configuration with no forced log level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed (for example by a
    /// test harness).
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Extract google-cloud-cpp proto component dependencies for a Conan recipe.
#[derive(Parser, Debug)]
#[command(
    name = "protodeps",
    about = "Extract google-cloud-cpp proto component dependencies",
    version,
    long_about = "Reads the generated *.deps manifests of a google-cloud-cpp source tree and \
                  prints the DEPENDENCIES, PROTO_COMPONENTS and COMPONENTS tables used by the \
                  Conan recipe."
)]
pub struct Cli {
    /// Directory where the google-cloud-cpp source has been extracted.
    #[arg(short = 's', long, value_name = "DIR")]
    source_folder: PathBuf,

    /// TOML file replacing some of the built-in correction tables.
    ///
    /// Tables present in the file replace the built-in table of the same name;
    /// absent tables keep their built-in value.
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,

    /// Enable debug logging on stderr.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Execute the CLI, printing the report on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the overrides, the listing file or any manifest
    /// cannot be loaded, or if stdout cannot be written.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        let stdout = std::io::stdout();
        self.execute_to(stdout.lock())
    }

    /// Build a [`CliConfig`] from the parsed flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
        }
    }

    /// Run the extraction and write the report to `writer`.
    ///
    /// Nothing is written unless the whole report was built successfully.
    ///
    /// # Errors
    ///
    /// Same as [`Cli::execute`].
    pub fn execute_to<W: Write>(self, writer: W) -> Result<()> {
        debug!("Extracting dependencies from {}", self.source_folder.display());
        let overrides = Overrides::load(self.overrides.as_deref())?;
        let report = build_report(&self.source_folder, &overrides)?;
        write_report(&report, writer).context("Failed to write report")
    }
}
