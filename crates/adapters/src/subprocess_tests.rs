// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

#[tokio::test]
async fn collects_stdout_and_status() {
    let output = run_with_timeout(sh("echo hello"), None, "echo").await.unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn nonzero_exit_is_returned_not_raised() {
    let output = run_with_timeout(sh("echo broken >&2; exit 3"), None, "fail").await.unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(diagnostics(&output), "broken");
}

#[tokio::test]
async fn deadline_kills_slow_command() {
    let err = run_with_timeout(sh("sleep 5"), Some(Duration::from_millis(50)), "sleep")
        .await
        .unwrap_err();
    assert!(matches!(err, SubprocessError::TimedOut { .. }));
    assert!(err.to_string().starts_with("sleep timed out"));
}

#[tokio::test]
async fn missing_binary_is_spawn_error() {
    let cmd = Command::new("/nonexistent/definitely-not-here");
    let err = run_with_timeout(cmd, None, "ghost").await.unwrap_err();
    assert!(matches!(err, SubprocessError::Spawn { .. }));
}

#[tokio::test]
async fn diagnostics_fall_back_to_stdout_then_status() {
    let output = run_with_timeout(sh("echo only-out; exit 1"), None, "out").await.unwrap();
    assert_eq!(diagnostics(&output), "only-out");

    let output = run_with_timeout(sh("exit 2"), None, "quiet").await.unwrap();
    assert!(diagnostics(&output).starts_with("exited with"));
}
