use assert_cmd::Command;
use predicates::prelude::*;
use protodeps_cli::test_utils::SourceTreeFixture;

use crate::protodeps;

/// Test that the source folder option is required
#[test]
fn test_missing_source_folder_argument() {
    Command::cargo_bin("protodeps")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--source-folder"));
}

/// Test that a malformed listing file aborts with no report
#[test]
fn test_malformed_listing_file() {
    let fixture = SourceTreeFixture::new().unwrap();
    fixture.write_libraries("load(\"//bazel:libraries.bzl\", \"x\")\n").unwrap();

    protodeps(fixture.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to list components"))
        .stderr(predicate::str::contains("line 1"))
        .stderr(predicate::str::contains("suggestion"));
}

/// Test that a listing file without the transition list is rejected
#[test]
fn test_incomplete_listing_file() {
    let fixture = SourceTreeFixture::new().unwrap();
    fixture
        .write_libraries(
            "GOOGLE_CLOUD_CPP_GA_LIBRARIES = []\nGOOGLE_CLOUD_CPP_EXPERIMENTAL_LIBRARIES = []\n",
        )
        .unwrap();

    protodeps(fixture.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("GOOGLE_CLOUD_CPP_TRANSITION_LIBRARIES"));
}

/// Test that an unreadable manifest is fatal
#[test]
fn test_unreadable_manifest() {
    let fixture = SourceTreeFixture::new().unwrap();
    std::fs::create_dir_all(fixture.deps_dir().join("storage.deps")).unwrap();

    protodeps(fixture.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("storage.deps"));
}

/// Test that an invalid overrides file is fatal
#[test]
fn test_invalid_overrides_file() {
    let fixture = SourceTreeFixture::new().unwrap();
    let overrides = fixture.path().join("overrides.toml");
    std::fs::write(&overrides, "[removed]\nx = 1\n").unwrap();

    protodeps(fixture.path())
        .arg("--overrides")
        .arg(&overrides)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to parse overrides"));
}
