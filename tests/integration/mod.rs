//! Integration test suite for protodeps
//!
//! End-to-end tests that run the `protodeps` binary against throwaway
//! google-cloud-cpp checkouts built with
//! [`SourceTreeFixture`](protodeps_cli::test_utils::SourceTreeFixture).
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **extract**: report contents for typical checkouts
//! - **determinism**: byte-identical output across runs
//! - **errors**: fatal inputs and exit status

mod determinism;
mod errors;
mod extract;

use assert_cmd::Command;

/// Build a `protodeps` command for the given checkout.
pub fn protodeps(source: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("protodeps").unwrap();
    cmd.arg("--source-folder").arg(source).env_remove("RUST_LOG");
    cmd
}

/// Run `protodeps` successfully and return its stdout.
pub fn extract(source: &std::path::Path) -> String {
    let output = protodeps(source).assert().success();
    String::from_utf8(output.get_output().stdout.clone()).unwrap()
}
