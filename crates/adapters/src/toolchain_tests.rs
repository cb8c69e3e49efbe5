// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::fs::PermissionsExt;
use yare::parameterized;

/// Write an executable shell script into `dir` and return its path.
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[parameterized(
    empty = { "", &[] },
    none_installed = { "No plugins added. Use `cordova plugin add <plugin>`.\n", &[] },
    two = {
        "cordova-plugin-whitelist 1.3.3 \"Whitelist\"\ncordova-plugin-camera 4.0.0 \"Camera\"\n",
        &["cordova-plugin-whitelist", "cordova-plugin-camera"]
    },
    blank_lines = { "\n  cordova-plugin-device 2.0.2 \"Device\"  \n\n", &["cordova-plugin-device"] },
)]
fn plugin_list_parsing(stdout: &str, expected: &[&str]) {
    assert_eq!(parse_plugin_list(stdout), expected);
}

#[tokio::test]
async fn shell_toolchain_reads_plugins_from_cordova() {
    let dir = tempfile::tempdir().unwrap();
    let cordova = script(
        dir.path(),
        "cordova",
        "echo 'cordova-plugin-whitelist 1.3.3 \"Whitelist\"'\necho 'cordova-plugin-file 6.0.1 \"File\"'",
    );
    let tools = ShellToolchain::new(ToolchainConfig { cordova, ..ToolchainConfig::default() });

    let plugins = tools.installed_plugins(dir.path()).await.unwrap();
    assert_eq!(plugins, vec!["cordova-plugin-whitelist", "cordova-plugin-file"]);
}

#[tokio::test]
async fn shell_toolchain_reports_failure_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let cordova = script(dir.path(), "cordova", "echo 'gradle exploded' >&2\nexit 1");
    let tools = ShellToolchain::new(ToolchainConfig { cordova, ..ToolchainConfig::default() });

    let err = tools.build(dir.path(), &Platform::Android, BuildKind::Debug).await.unwrap_err();
    assert_eq!(
        err,
        ToolError::Failed {
            command: "cordova build".to_string(),
            diagnostics: "gradle exploded".to_string()
        }
    );
    assert_eq!(err.to_string(), "cordova build failed: gradle exploded");
}

#[tokio::test]
async fn shell_toolchain_passes_build_flag() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("args");
    let cordova = script(dir.path(), "cordova", &format!("echo \"$@\" > {}", log.display()));
    let tools = ShellToolchain::new(ToolchainConfig { cordova, ..ToolchainConfig::default() });

    tools.build(dir.path(), &Platform::Ios, BuildKind::Release).await.unwrap();
    let args = std::fs::read_to_string(&log).unwrap();
    assert_eq!(args.trim(), "--no-telemetry build ios --release");
}

#[tokio::test]
async fn shell_toolchain_enforces_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let cordova = script(dir.path(), "cordova", "sleep 5");
    let tools = ShellToolchain::new(ToolchainConfig {
        cordova,
        timeout: Some(Duration::from_millis(50)),
        ..ToolchainConfig::default()
    });

    let err = tools.add_platform(dir.path(), &Platform::Android).await.unwrap_err();
    assert!(matches!(err, ToolError::Subprocess(SubprocessError::TimedOut { .. })));
}

#[tokio::test]
async fn fake_records_calls_and_tracks_plugins() {
    let dir = tempfile::tempdir().unwrap();
    let tools = FakeToolchain::new();
    tools.set_installed(["a", "b"]);

    tools.remove_plugins(dir.path(), &["a".to_string()]).await.unwrap();
    tools.add_plugins(dir.path(), &["c".to_string(), "b".to_string()]).await.unwrap();

    assert_eq!(tools.installed(), vec!["b", "c"]);
    assert_eq!(tools.ops(), vec!["remove_plugins", "add_plugins"]);
}

#[tokio::test]
async fn fake_build_writes_platform_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let tools = FakeToolchain::new();
    tools.build(dir.path(), &Platform::Android, BuildKind::Debug).await.unwrap();
    assert!(dir
        .path()
        .join("platforms/android/app/build/outputs/apk/debug/app-debug.apk")
        .exists());
}

#[tokio::test]
async fn fake_failure_is_recorded_then_raised() {
    let dir = tempfile::tempdir().unwrap();
    let tools = FakeToolchain::new();
    tools.fail("add_platform", "no sdk");

    let err = tools.add_platform(dir.path(), &Platform::Ios).await.unwrap_err();
    assert_eq!(err.to_string(), "add_platform failed: no sdk");
    assert_eq!(tools.calls(), vec![ToolCall::AddPlatform { platform: "ios".into() }]);
    assert!(!dir.path().join("platforms/ios").exists());
}

#[tokio::test]
async fn held_build_waits_for_release() {
    let dir = tempfile::tempdir().unwrap();
    let tools = FakeToolchain::new();
    let gate = tools.hold_builds();

    let task = {
        let tools = tools.clone();
        let project = dir.path().to_path_buf();
        tokio::spawn(async move { tools.build(&project, &Platform::Browser, BuildKind::Debug).await })
    };
    tools.build_started().await;
    assert!(tools.calls().is_empty());

    gate.notify_one();
    task.await.unwrap().unwrap();
    assert_eq!(tools.ops(), vec!["build"]);
}
