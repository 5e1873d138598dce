use protodeps_cli::test_utils::SourceTreeFixture;

use crate::extract;

/// Test that repeated runs over the same checkout are byte-identical
#[test]
fn test_repeated_runs_are_identical() {
    let fixture = SourceTreeFixture::new().unwrap();
    let manifests = [
        ("speech", "speech/v1"),
        ("trace", "devtools/cloudtrace/v2"),
        ("asset", "cloud/asset/v1"),
    ];
    for (name, package) in manifests {
        let own = format!("@com_google_googleapis//google/{package}:{name}_proto");
        fixture
            .write_manifest_labels(
                name,
                &[
                    own.as_str(),
                    "@com_google_googleapis//google/api:annotations_proto",
                    "@com_google_googleapis//google/rpc:status_proto",
                ],
            )
            .unwrap();
    }

    let first = extract(fixture.path());
    let second = extract(fixture.path());
    assert_eq!(first, second);
}

/// Test that entries follow manifest file order, then hard-coded key order
#[test]
fn test_dependency_entry_order() {
    let fixture = SourceTreeFixture::new().unwrap();
    let code = "@com_google_googleapis//google/rpc:code_proto";
    fixture.write_manifest_labels("zeta", &[code]).unwrap();
    fixture.write_manifest_labels("alpha", &[code]).unwrap();

    let output = extract(fixture.path());
    let alpha = output.find("\"alpha_protos\":").unwrap();
    let zeta = output.find("\"zeta_protos\":").unwrap();
    let hard_coded = output.find("\"api_annotations_protos\":").unwrap();
    assert!(alpha < zeta);
    assert!(zeta < hard_coded);
}
