//! Core types for protodeps
//!
//! Error types and the user-facing error reporting shared by every stage of
//! the extraction pipeline. See [`error`] for the full taxonomy.

pub mod error;

pub use error::{ErrorContext, ProtodepsError, user_friendly_error};
