//! Tests for `ProcessLauncher` and `ProcessHandle`.

use std::io::Read as _;

use camino::Utf8PathBuf;
use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::capture_file::CaptureFile;

fn sh(script: &str) -> LaunchCommand {
    LaunchCommand::new("sh").arg("-c").arg(script)
}

#[rstest]
#[case::success("exit 0", 0)]
#[case::failure("exit 42", 42)]
fn wait_reports_exit_code(#[case] script: &str, #[case] expected: i32) {
    let mut handle = ProcessLauncher
        .launch(&sh(script), &RedirectionPolicy::PipeBoth)
        .expect("launch should succeed");

    assert_eq!(handle.exit_code(), None);
    assert_eq!(handle.wait().expect("wait should succeed"), expected);
    assert_eq!(handle.exit_code(), Some(expected));
}

#[test]
fn second_wait_returns_recorded_exit_code() {
    let mut handle = ProcessLauncher
        .launch(&sh("exit 3"), &RedirectionPolicy::PipeBoth)
        .expect("launch should succeed");

    let first = handle.wait().expect("first wait");
    let second = handle.wait().expect("second wait");

    assert_eq!(first, 3);
    assert_eq!(second, 3);
}

#[test]
fn pipe_both_exposes_stream_endpoints_once() {
    let mut handle = ProcessLauncher
        .launch(&sh("printf out"), &RedirectionPolicy::PipeBoth)
        .expect("launch should succeed");

    let mut stdout = handle.take_stdout().expect("stdout should be piped");
    assert!(handle.take_stdout().is_none());
    let mut captured = String::new();
    stdout.read_to_string(&mut captured).expect("read stdout");
    assert!(handle.take_stderr().is_some());

    assert_eq!(handle.wait().expect("wait should succeed"), 0);
    assert_eq!(captured, "out");
}

#[test]
fn inherit_with_stdout_file_writes_to_file() {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 tempdir");
    let file = CaptureFile::new(root.join("stdout.txt"));
    let policy = RedirectionPolicy::InheritWithStdoutFile(file.clone());

    let mut handle = ProcessLauncher
        .launch(&sh("printf redirected"), &policy)
        .expect("launch should succeed");

    assert!(handle.take_stdout().is_none());
    assert_eq!(handle.wait().expect("wait should succeed"), 0);
    assert_eq!(file.read().expect("read capture"), b"redirected");
}

#[test]
fn missing_binary_is_spawn_error() {
    let result = ProcessLauncher.launch(
        &LaunchCommand::new("definitely-not-a-real-binary-xyz"),
        &RedirectionPolicy::PipeBoth,
    );

    match result {
        Err(LaunchError::Spawn { command, .. }) => {
            assert_eq!(command, "definitely-not-a-real-binary-xyz");
        }
        other => panic!("expected LaunchError::Spawn, got {other:?}"),
    }
}

#[test]
fn unwritable_stdout_target_is_redirect_error() {
    let policy = RedirectionPolicy::InheritWithStdoutFile(CaptureFile::new(
        "/definitely/not/a/real/dir/stdout.txt",
    ));

    let result = ProcessLauncher.launch(&sh("exit 0"), &policy);

    assert!(
        matches!(result, Err(LaunchError::Redirect { .. })),
        "unexpected result: {result:?}"
    );
}

#[test]
fn signalled_child_reports_missing_exit_code() {
    let mut handle = ProcessLauncher
        .launch(&sh("kill -9 $$"), &RedirectionPolicy::PipeBoth)
        .expect("launch should succeed");

    let err = handle.wait().expect_err("signalled child has no exit code");
    assert!(
        matches!(err, LaunchError::MissingExitCode { .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn command_line_escapes_arguments() {
    let command = LaunchCommand::new("/opt/rt/bin/java")
        .args(["--search-path", "/tmp/my classes"])
        .arg("Probe");

    assert_eq!(
        command.command_line(),
        "/opt/rt/bin/java --search-path '/tmp/my classes' Probe"
    );
}
