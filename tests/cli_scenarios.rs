//! End-to-end scenario runs of `conbind` against the real probe binary.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use conbind::DefaultNamespace;
use conbind::pty::PtyPrimitives;
use predicates::prelude::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

/// Temporary test root with `bin/conbind-probe` linked to the built probe.
struct TestRoot {
    dir: TempDir,
}

impl TestRoot {
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `conbind` configured through the environment and run from the root,
    /// so no stray `conbind.toml` is discovered.
    fn conbind(&self, scenario: &str) -> Command {
        let mut cmd = cargo_bin_cmd!("conbind");
        cmd.arg(scenario)
            .current_dir(self.path())
            .env("CONBIND_TEST_ROOT", self.path())
            .env_remove("CONBIND_CONFIG_PATH")
            .env_remove("CONBIND_EXPECTED_OUTPUT")
            .env_remove("CONBIND_ENTRY")
            .env_remove("CONBIND_LAUNCHER_NAME")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[fixture]
fn test_root() -> TestRoot {
    let dir = TempDir::new().expect("tempdir");
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).expect("create bin");
    symlink(env!("CARGO_BIN_EXE_conbind-probe"), bin.join("conbind-probe"))
        .expect("link probe");
    TestRoot { dir }
}

#[rstest]
fn redirect_all_passes_silently(test_root: TestRoot) {
    test_root
        .conbind("redirect-all")
        .assert()
        .success()
        .stdout("")
        .stderr("");
}

#[rstest]
fn redirect_all_fails_on_unexpected_output(test_root: TestRoot) {
    test_root
        .conbind("redirect-all")
        .env("CONBIND_EXPECTED_OUTPUT", "Goodbye!")
        .assert()
        .code(1)
        .stdout("")
        .stderr(
            predicate::str::contains("unexpected stdout")
                .and(predicate::str::contains("'Goodbye!'"))
                .and(predicate::str::contains("'Hello!'")),
        );
}

#[rstest]
fn redirect_all_reports_every_diverging_field(test_root: TestRoot) {
    // `flood` without a byte count is a usage error: the probe exits 2 with
    // usage text on stderr and nothing on stdout.
    test_root
        .conbind("redirect-all")
        .env("CONBIND_ENTRY", "flood")
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("unexpected exit code: expected 0, got 2")
                .and(predicate::str::contains("unexpected stdout"))
                .and(predicate::str::contains("unexpected stderr")),
        );
}

#[rstest]
fn cli_test_root_overrides_environment(test_root: TestRoot) {
    let empty = TempDir::new().expect("tempdir");
    test_root
        .conbind("redirect-all")
        .env("CONBIND_TEST_ROOT", empty.path())
        .arg("--test-root")
        .arg(test_root.path())
        .assert()
        .success();
}

#[rstest]
fn missing_test_root_is_a_configuration_error(test_root: TestRoot) {
    test_root
        .conbind("redirect-all")
        .env_remove("CONBIND_TEST_ROOT")
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("configuration error")
                .and(predicate::str::contains("CONBIND_TEST_ROOT")),
        );
}

/// Whether this host provides both pty primitives, resolved the same way the
/// harness resolves them.
fn pty_available() -> bool {
    PtyPrimitives::resolve(&DefaultNamespace::new()).is_ok()
}

#[rstest]
fn redirect_out_only_exits_zero_and_captures_stdout(test_root: TestRoot) {
    let stdout_file = test_root.path().join("stdout.txt");
    fs::write(&stdout_file, "stale").expect("seed stale output");

    let assert = test_root.conbind("redirect-out-only").assert().code(0);

    if pty_available() {
        assert.stderr("");
        assert_eq!(fs::read(&stdout_file).expect("capture file"), b"Hello!");
    } else {
        assert.stderr(predicate::str::contains("skipping redirect-out-only"));
        assert!(!stdout_file.exists(), "stale output is removed before skipping");
    }
}

#[rstest]
fn redirect_out_only_reports_mismatch_on_original_stderr(test_root: TestRoot) {
    let assert = test_root
        .conbind("redirect-out-only")
        .arg("--expect")
        .arg("Goodbye!")
        .assert();

    if pty_available() {
        assert.code(1).stdout("").stderr(
            predicate::str::contains("redirect-out-only failed")
                .and(predicate::str::contains("unexpected stdout"))
                .and(predicate::str::contains("'Goodbye!'")),
        );
    } else {
        assert.code(0);
    }
}

#[rstest]
fn redirect_out_only_reports_launch_failure(test_root: TestRoot) {
    let assert = test_root
        .conbind("redirect-out-only")
        .env("CONBIND_LAUNCHER_NAME", "absent-launcher")
        .assert();

    if pty_available() {
        assert
            .code(1)
            .stderr(predicate::str::contains("failed to launch"));
    } else {
        assert.code(0);
    }
}
