//! Error handling for protodeps
//!
//! This module provides the strongly-typed error enum for the extraction
//! pipeline and the user-facing error reporting used by the CLI.
//!
//! # Architecture
//!
//! - [`ProtodepsError`] - Enumerated failure cases of the pipeline
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//!
//! Every failure is fatal: the tool either prints a complete report or prints
//! nothing useful and exits non-zero. Errors therefore carry enough context
//! (file, line) for a maintainer to fix the input and re-run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use protodeps_cli::core::{ProtodepsError, user_friendly_error};
//!
//! let error = ProtodepsError::MissingListingVariable {
//!     file: "libraries.bzl".to_string(),
//!     name: "GOOGLE_CLOUD_CPP_GA_LIBRARIES".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // Colored error with a suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for protodeps operations
///
/// # Error Categories
///
/// ## Listing file (`libraries.bzl`)
/// - [`ListingSyntax`] - The file uses syntax outside the supported subset
/// - [`MissingListingVariable`] - A required library list is not defined
/// - [`InvalidListingVariable`] - A required variable is not a list of strings
///
/// ## Manifests and tables
/// - [`ManifestRead`] - A `*.deps` file exists but cannot be read
/// - [`InvalidOverrides`] - The overrides TOML does not match the schema
///
/// ## Conversions
/// - [`IoError`] - Standard I/O errors from [`std::io::Error`]
/// - [`TomlError`] - TOML parsing errors from [`toml::de::Error`]
///
/// [`ListingSyntax`]: ProtodepsError::ListingSyntax
/// [`MissingListingVariable`]: ProtodepsError::MissingListingVariable
/// [`InvalidListingVariable`]: ProtodepsError::InvalidListingVariable
/// [`ManifestRead`]: ProtodepsError::ManifestRead
/// [`InvalidOverrides`]: ProtodepsError::InvalidOverrides
/// [`IoError`]: ProtodepsError::IoError
/// [`TomlError`]: ProtodepsError::TomlError
#[derive(Error, Debug)]
pub enum ProtodepsError {
    /// The listing file contains something the listing parser does not accept.
    #[error("Invalid listing file syntax in {file} at line {line}: {reason}")]
    ListingSyntax {
        /// Path of the listing file
        file: String,
        /// 1-based line of the offending token
        line: usize,
        /// What was expected or found
        reason: String,
    },

    /// A library list the lister depends on is not assigned in the listing file.
    #[error("Listing file {file} does not define {name}")]
    MissingListingVariable {
        /// Path of the listing file
        file: String,
        /// Name of the missing variable
        name: String,
    },

    /// A library list is assigned but is not a list of strings.
    #[error("Listing file {file} defines {name} as {found}, expected a list of strings")]
    InvalidListingVariable {
        /// Path of the listing file
        file: String,
        /// Name of the variable
        name: String,
        /// Short description of the value found instead
        found: String,
    },

    /// A manifest file was found but could not be read.
    #[error("Failed to read manifest {path}")]
    ManifestRead {
        /// Path of the manifest
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The overrides file parsed as TOML but failed validation.
    #[error("Invalid overrides in {file}: {reason}")]
    InvalidOverrides {
        /// Path of the overrides file
        file: String,
        /// Why the tables were rejected
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error wrapper with user-facing details and a suggestion
///
/// Produced by [`user_friendly_error`] and printed by the CLI on failure.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are printed in green to draw attention.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`]
///
/// The outermost message is kept as the error line. When the chain contains a
/// [`ProtodepsError`], a suggestion tailored to that failure is attached; the
/// remaining causes become the details line.
///
/// # Examples
///
/// ```rust,no_run
/// use protodeps_cli::core::user_friendly_error;
///
/// let error = anyhow::anyhow!("Something went wrong");
/// let context = user_friendly_error(error);
/// context.display();
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    let mut context = ErrorContext::new(error.to_string());
    if !causes.is_empty() {
        context = context.with_details(causes.join(": "));
    }

    let suggestion = error.chain().find_map(|cause| {
        if let Some(protodeps_error) = cause.downcast_ref::<ProtodepsError>() {
            return suggestion_for(protodeps_error);
        }
        cause.downcast_ref::<std::io::Error>().map(|io_error| match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                "Check the permissions of the google-cloud-cpp checkout".to_string()
            }
            _ => "Check that --source-folder points at an extracted google-cloud-cpp source tree"
                .to_string(),
        })
    });

    match suggestion {
        Some(suggestion) => context.with_suggestion(suggestion),
        None => context,
    }
}

fn suggestion_for(error: &ProtodepsError) -> Option<String> {
    match error {
        ProtodepsError::ListingSyntax { .. } => Some(
            "libraries.bzl may only contain comments, docstrings and list assignments; \
             delete the file to fall back to the built-in component lists"
                .to_string(),
        ),
        ProtodepsError::MissingListingVariable { name, .. } => Some(format!(
            "Check that this google-cloud-cpp release still defines {name} in libraries.bzl"
        )),
        ProtodepsError::InvalidListingVariable { .. } => {
            Some("Library lists must be lists of quoted component names".to_string())
        }
        ProtodepsError::ManifestRead { .. } => {
            Some("Check the permissions of the protodeps directory".to_string())
        }
        ProtodepsError::InvalidOverrides { .. } | ProtodepsError::TomlError(_) => Some(
            "Compare the overrides file with src/overrides/defaults.toml for the expected tables"
                .to_string(),
        ),
        ProtodepsError::IoError(_) | ProtodepsError::Other { .. } => None,
    }
}
