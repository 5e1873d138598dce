//! Manifest normalization.
//!
//! Each `*.deps` manifest holds one Bazel label per line, for example
//! `@com_google_googleapis//google/api:annotations_proto`. The CMake build
//! names the same library `api_annotations_protos`. [`normalize_target`]
//! performs that rewrite with the same textual substitutions upstream uses,
//! then applies the removal and rename tables.
//!
//! The substitutions are deliberately literal. `_proto` is replaced wherever
//! it occurs, not only as a suffix, and the marker and `google/` removals
//! apply to every occurrence. Blank lines normalize to an empty name and are
//! kept.

use crate::constants::{GOOGLE_PATH_PREFIX, WORKSPACE_MARKER};
use crate::core::ProtodepsError;
use crate::overrides::Overrides;
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::trace;

/// Rewrite one raw manifest line into a downstream component name.
///
/// Returns `None` when the normalized name is listed in
/// [`Overrides::removed_targets`].
///
/// # Examples
///
/// ```rust
/// use protodeps_cli::normalize::normalize_target;
/// use protodeps_cli::overrides::Overrides;
///
/// # fn example() -> anyhow::Result<()> {
/// let overrides = Overrides::builtin()?;
/// assert_eq!(
///     normalize_target("@com_google_googleapis//google/type:expr_proto", &overrides),
///     Some("type_expr_protos".to_string())
/// );
/// assert_eq!(
///     normalize_target("@com_google_googleapis//google/cloud/kms/v1:kms_proto", &overrides),
///     None
/// );
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn normalize_target(line: &str, overrides: &Overrides) -> Option<String> {
    let name = line
        .trim()
        .replace(':', "_")
        .replace("_proto", "_protos")
        .replace(WORKSPACE_MARKER, "")
        .replace(GOOGLE_PATH_PREFIX, "")
        .replace('/', "_");

    if overrides.removed_targets.contains(&name) {
        trace!("Dropping removed target {name}");
        return None;
    }
    match overrides.replaced_targets.get(&name) {
        Some(replacement) => Some(replacement.clone()),
        None => Some(name),
    }
}

/// Load the dependency list of one manifest.
///
/// The result starts with [`Overrides::common_requires`] in sorted order,
/// followed by the normalized lines in file order. Duplicates are kept. Lines
/// end at `\n`, `\r\n` or a bare `\r`.
///
/// # Errors
///
/// Returns [`ProtodepsError::ManifestRead`] if the file cannot be read or is
/// not valid UTF-8.
pub fn load_manifest(path: &Path, overrides: &Overrides) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| ProtodepsError::ManifestRead {
        path: path.display().to_string(),
        source,
    })?;

    let mut requires: Vec<String> = overrides.common_requires.iter().cloned().collect();
    requires.extend(manifest_lines(&content).filter_map(|line| normalize_target(line, overrides)));
    Ok(requires)
}

/// Split on every line ending, old Mac `\r` included.
fn manifest_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(end) = rest.find(['\n', '\r']) else {
            return Some(std::mem::take(&mut rest));
        };
        let line = &rest[..end];
        let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[end + skip..];
        Some(line)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SourceTreeFixture;

    fn overrides() -> Overrides {
        Overrides::builtin().unwrap()
    }

    #[test]
    fn test_normalize_typical_labels() {
        let overrides = overrides();
        assert_eq!(
            normalize_target("@com_google_googleapis//google/api:annotations_proto", &overrides)
                .as_deref(),
            Some("api_annotations_protos")
        );
        assert_eq!(
            normalize_target(
                "  @com_google_googleapis//google/cloud/speech/v1:speech_proto\n",
                &overrides
            )
            .as_deref(),
            Some("cloud_speech_v1_speech_protos")
        );
    }

    #[test]
    fn test_normalize_removed_target_is_dropped() {
        let overrides = overrides();
        assert_eq!(
            normalize_target("@com_google_googleapis//google/cloud/kms/v1:kms_proto", &overrides),
            None
        );
        assert_eq!(
            normalize_target(
                "@com_google_googleapis//google/identity/accesscontextmanager/type:type_proto",
                &overrides
            ),
            None
        );
    }

    #[test]
    fn test_normalize_replaced_target() {
        let overrides = overrides();
        assert_eq!(
            normalize_target("@com_google_googleapis//grafeas/v1:grafeas_proto", &overrides)
                .as_deref(),
            Some("grafeas_protos")
        );
        assert_eq!(
            normalize_target("@com_google_googleapis//google/devtools/source/v1:source_proto", &overrides)
                .as_deref(),
            Some("devtools_source_v1_source_context_protos")
        );
    }

    #[test]
    fn test_normalize_proto_is_a_substring_rewrite() {
        let overrides = overrides();
        // `_proto` inside a path segment is rewritten too
        assert_eq!(
            normalize_target("@com_google_googleapis//google/my_proto_lib:x_proto", &overrides)
                .as_deref(),
            Some("my_protos_lib_x_protos")
        );
        // Colons become underscores before the rewrite, so `pkg:proto_x` matches
        assert_eq!(
            normalize_target("pkg:proto_x", &overrides).as_deref(),
            Some("pkg_protos_x")
        );
        // Already-normalized names gain another `s`
        assert_eq!(
            normalize_target("api_annotations_protos", &overrides).as_deref(),
            Some("api_annotations_protoss")
        );
    }

    #[test]
    fn test_normalize_strips_every_google_segment() {
        let overrides = overrides();
        assert_eq!(
            normalize_target("@com_google_googleapis//google/cloud/google/x:y_proto", &overrides)
                .as_deref(),
            Some("cloud_x_y_protos")
        );
    }

    #[test]
    fn test_normalize_name_without_markers_is_unchanged() {
        let overrides = overrides();
        assert_eq!(
            normalize_target("rpc_status_protos", &overrides).as_deref(),
            Some("rpc_status_protoss")
        );
        assert_eq!(normalize_target("grpc_utils", &overrides).as_deref(), Some("grpc_utils"));
    }

    #[test]
    fn test_normalize_blank_line_is_empty_name() {
        let overrides = overrides();
        assert_eq!(normalize_target("   ", &overrides).as_deref(), Some(""));
    }

    #[test]
    fn test_load_manifest_prepends_common_requires() {
        let fixture = SourceTreeFixture::new().unwrap();
        let path = fixture
            .write_manifest(
                "iam_v1_iam_policy",
                "@com_google_googleapis//google/api:annotations_proto\n\
                 @com_google_googleapis//google/type:expr_proto\n",
            )
            .unwrap();

        let deps = load_manifest(&path, &overrides()).unwrap();
        assert_eq!(
            deps,
            vec![
                "grpc::_grpc",
                "grpc::grpc++",
                "protobuf::libprotobuf",
                "api_annotations_protos",
                "type_expr_protos",
            ]
        );
    }

    #[test]
    fn test_load_manifest_always_adds_common_requires() {
        let fixture = SourceTreeFixture::new().unwrap();
        let path = fixture.write_manifest("runtime", "grpc::grpc++\n").unwrap();

        let deps = load_manifest(&path, &overrides()).unwrap();
        assert_eq!(deps.len(), 4);
        assert_eq!(deps.iter().filter(|d| *d == "grpc::grpc++").count(), 1);
        assert_eq!(deps[3], "grpc__grpc++");
    }

    #[test]
    fn test_load_manifest_keeps_blank_lines_and_duplicates() {
        let fixture = SourceTreeFixture::new().unwrap();
        let path = fixture
            .write_manifest(
                "dup",
                "@com_google_googleapis//google/rpc:status_proto\n\n\
                 @com_google_googleapis//google/rpc:status_proto\n\
                 @com_google_googleapis//google/cloud/kms/v1:kms_proto\n",
            )
            .unwrap();

        let deps = load_manifest(&path, &overrides()).unwrap();
        assert_eq!(&deps[3..], &["rpc_status_protos", "", "rpc_status_protos"]);
    }

    #[test]
    fn test_load_manifest_splits_every_line_ending() {
        let fixture = SourceTreeFixture::new().unwrap();
        let path = fixture
            .write_manifest(
                "mixed",
                "@com_google_googleapis//google/api:http_proto\r\
                 @com_google_googleapis//google/type:expr_proto\r\n\
                 @com_google_googleapis//google/rpc:code_proto",
            )
            .unwrap();

        let deps = load_manifest(&path, &overrides()).unwrap();
        assert_eq!(&deps[3..], &["api_http_protos", "type_expr_protos", "rpc_code_protos"]);
    }

    #[test]
    fn test_manifest_lines_matches_text_mode_reads() {
        assert_eq!(
            manifest_lines("a\rb\r\nc\n\nd").collect::<Vec<_>>(),
            vec!["a", "b", "c", "", "d"]
        );
        assert_eq!(manifest_lines("a\n").collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(manifest_lines("").count(), 0);
    }

    #[test]
    fn test_load_manifest_missing_file() {
        let fixture = SourceTreeFixture::new().unwrap();
        let err = load_manifest(&fixture.path().join("nope.deps"), &overrides()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProtodepsError>(),
            Some(ProtodepsError::ManifestRead { .. })
        ));
    }
}
