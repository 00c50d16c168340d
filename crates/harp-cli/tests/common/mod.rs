//! Shared E2E test helpers for `harp` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::time::Duration;
use tempfile::TempDir;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

const HARP_VARS: &[&str] = &["HARP_DEBUG", "HARP_QUEUE_CAPACITY", "HARP_LOG_LEVEL", "RUST_LOG"];

/// Build a Command for the `harp` binary isolated from the user's config.
///
/// HOME and the working directory both point into the returned tempdir,
/// so neither the global nor the project config of the host leaks in.
pub fn harp_cmd() -> (assert_cmd::Command, TempDir) {
    let home = TempDir::new().expect("create temp home");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("harp");
    cmd.timeout(TIMEOUT_BASIC)
        .env("HOME", home.path())
        .current_dir(home.path());
    for var in HARP_VARS {
        cmd.env_remove(var);
    }
    (cmd, home)
}
