use predicates::prelude::*;
use protodeps_cli::test_utils::SourceTreeFixture;

use crate::{extract, protodeps};

const ANNOTATIONS: &str = "@com_google_googleapis//google/api:annotations_proto";
const EXPR: &str = "@com_google_googleapis//google/type:expr_proto";
const KMS: &str = "@com_google_googleapis//google/cloud/kms/v1:kms_proto";

/// Extract the lines of one `NAME = {...}` table from the output.
fn table<'a>(output: &'a str, name: &str) -> Vec<&'a str> {
    let header = format!("{name} = {{");
    output
        .lines()
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| *line != "}")
        .collect()
}

/// Test the documented example manifest end to end
#[test]
fn test_iam_policy_manifest() {
    protodeps_cli::test_utils::init_test_logging(None);
    let fixture = SourceTreeFixture::new().unwrap();
    fixture.write_manifest_labels("iam_v1_iam_policy", &[ANNOTATIONS, EXPR]).unwrap();

    protodeps(fixture.path()).assert().success().stdout(predicate::str::contains(
        "    \"iam_v1_iam_policy_protos\": ['api_annotations_protos', 'grpc::_grpc', \
         'grpc::grpc++', 'protobuf::libprotobuf', 'type_expr_protos'],\n",
    ));
}

/// Test that a checkout without manifests still prints the built-in tables
#[test]
fn test_empty_checkout_uses_defaults() {
    let fixture = SourceTreeFixture::new().unwrap();
    let output = extract(fixture.path());

    let dependencies = table(&output, "DEPENDENCIES");
    assert_eq!(dependencies.len(), 15);
    assert_eq!(dependencies[0], "    \"api_annotations_protos\": ['api_http_protos'],");
    assert!(dependencies.contains(
        &"    \"devtools_cloudtrace_v2_tracing_protos\": ['api_client_protos', \
          'api_field_behavior_protos', 'devtools_cloudtrace_v2_trace_protos', \
          'devtools_cloudtrace_v2_trace_protos', 'rpc_status_protos'],"
    ));

    let proto_components = table(&output, "PROTO_COMPONENTS");
    assert!(proto_components.contains(&"    \"rpc_status_protos\","));
    assert!(!proto_components.iter().any(|line| line.contains("grpc::")));

    let components = table(&output, "COMPONENTS");
    assert!(components.contains(&"    \"storage\","));
    assert!(!components.iter().any(|line| line.contains("apikeys")));
}

/// Test that experimental and unused manifests are skipped
#[test]
fn test_skipped_manifests() {
    let fixture = SourceTreeFixture::new().unwrap();
    fixture
        .write_libraries(
            r#"
GOOGLE_CLOUD_CPP_EXPERIMENTAL_LIBRARIES = ["pubsublite"]
GOOGLE_CLOUD_CPP_TRANSITION_LIBRARIES = ["batch"]
GOOGLE_CLOUD_CPP_GA_LIBRARIES = ["iam"]
"#,
        )
        .unwrap();
    fixture.write_manifest_labels("pubsublite", &[ANNOTATIONS]).unwrap();
    fixture.write_manifest_labels("iam_policy", &[EXPR]).unwrap();
    fixture.write_manifest_labels("batch", &[EXPR]).unwrap();

    let output = extract(fixture.path());
    assert!(!output.contains("pubsublite_protos"));
    assert!(!output.contains("\"iam_policy_protos\""));
    assert!(output.contains("    \"batch_protos\": "));
    assert_eq!(table(&output, "COMPONENTS"), vec!["    \"batch\",", "    \"iam\""]);
}

/// Test that removed targets never reach the output
#[test]
fn test_removed_targets_are_dropped() {
    let fixture = SourceTreeFixture::new().unwrap();
    fixture.write_manifest_labels("cloud_ekm_v1", &[KMS, EXPR]).unwrap();

    protodeps(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cloud_kms_v1_kms_protos").not())
        .stdout(predicate::str::contains("    \"cloud_ekm_v1_protos\": "));
}

/// Test that every name in DEPENDENCIES is listed in PROTO_COMPONENTS
#[test]
fn test_proto_components_closure() {
    let fixture = SourceTreeFixture::new().unwrap();
    fixture
        .write_manifest_labels(
            "cloud_foo_v1",
            &[ANNOTATIONS, "@com_google_googleapis//google/cloud/foo/type:bar_proto"],
        )
        .unwrap();
    fixture.write_manifest_labels("common", &[EXPR]).unwrap();

    let output = extract(fixture.path());
    let proto_components = table(&output, "PROTO_COMPONENTS").join("\n");
    for line in table(&output, "DEPENDENCIES") {
        for name in line.split(['"', '\'']).filter(|s| s.ends_with("_protos")) {
            assert!(
                proto_components.contains(&format!("\"{name}\"")),
                "{name} missing from PROTO_COMPONENTS"
            );
        }
    }
    assert!(proto_components.contains("\"cloud_foo_type_bar_protos\""));
    assert!(proto_components.contains("\"cloud_common_common_protos\""));
}

/// Test that logs stay off stdout
#[test]
fn test_verbose_logs_go_to_stderr() {
    let fixture = SourceTreeFixture::new().unwrap();
    fixture.write_manifest_labels("iam_policy", &[EXPR]).unwrap();

    protodeps(fixture.path())
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Automatically generated by protodeps"))
        .stdout(predicate::str::contains("Skipping manifest").not())
        .stderr(predicate::str::contains("Skipping manifest"));
}
