//! Global constants used throughout the protodeps codebase.
//!
//! File names, directory layout and label markers of the google-cloud-cpp
//! source tree. Defining them centrally keeps the layout assumptions in one
//! place when upstream moves things around.

/// Listing file at the root of a google-cloud-cpp checkout.
///
/// A Starlark file defining the GA, transition and experimental library lists.
pub const LIBRARIES_FILE: &str = "libraries.bzl";

/// Directory holding the generated `*.deps` manifests, relative to the checkout.
pub const PROTODEPS_DIR: [&str; 3] = ["external", "googleapis", "protodeps"];

/// Extension of a proto dependency manifest, including the leading dot.
pub const MANIFEST_EXTENSION: &str = ".deps";

/// Suffix turning a manifest base name into a component name.
pub const PROTOS_SUFFIX: &str = "_protos";

/// External repository marker prefixed to every upstream Bazel label.
pub const WORKSPACE_MARKER: &str = "@com_google_googleapis//";

/// Leading path component of every googleapis proto package.
pub const GOOGLE_PATH_PREFIX: &str = "google/";

/// Variable in `libraries.bzl` listing the GA libraries.
pub const GA_LIBRARIES_VAR: &str = "GOOGLE_CLOUD_CPP_GA_LIBRARIES";

/// Variable in `libraries.bzl` listing libraries that recently left experimental.
pub const TRANSITION_LIBRARIES_VAR: &str = "GOOGLE_CLOUD_CPP_TRANSITION_LIBRARIES";

/// Variable in `libraries.bzl` listing the experimental libraries.
pub const EXPERIMENTAL_LIBRARIES_VAR: &str = "GOOGLE_CLOUD_CPP_EXPERIMENTAL_LIBRARIES";

/// Name written into the generated-file banner.
pub const GENERATOR_NAME: &str = "protodeps";
