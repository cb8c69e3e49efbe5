// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

const VARS: &[&str] = &[
    "SW_CONFIG",
    "SW_WORKER_ADDR",
    "SW_WORK_ROOT",
    "SW_STAGE_TIMEOUT_SECS",
    "SW_HUB_ADDR",
    "SW_WORKERS",
    "SW_RECONNECT_DELAY_MS",
    "SW_SELECTION",
    "SW_IPC_TIMEOUT_MS",
    "SW_LOG",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.worker.listen, "127.0.0.1:7301");
    assert_eq!(config.hub.listen, "127.0.0.1:7300");
    assert_eq!(config.reconnect_delay(), Duration::from_secs(2));
    assert_eq!(config.ipc_timeout(), Duration::from_secs(5));
    assert_eq!(config.hub.selection, SelectionPolicy::LeastLoaded);
    assert_eq!(config.log.filter, "info");
    assert_eq!(config.toolchain().timeout, None);
}

#[test]
fn partial_toml_keeps_defaults() {
    let config = Config::from_toml(
        r#"
        [hub]
        workers = ["10.0.0.1:7301", "10.0.0.2:7301"]
        selection = "first"

        [worker]
        stage_timeout_secs = 600
        "#,
    )
    .unwrap();

    assert_eq!(config.hub.workers.len(), 2);
    assert_eq!(config.hub.selection, SelectionPolicy::First);
    assert_eq!(config.hub.listen, "127.0.0.1:7300");
    assert_eq!(config.toolchain().timeout, Some(Duration::from_secs(600)));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Config::from_toml("[hub]\nworkerz = []\n").unwrap_err();
    assert!(matches!(err, LifecycleError::Config(_)));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, LifecycleError::ConfigRead(..)));
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sw.toml");
    std::fs::write(&path, "[hub]\nlisten = \"0.0.0.0:9000\"\nreconnect_delay_ms = 100\n").unwrap();

    std::env::set_var("SW_CONFIG", &path);
    std::env::set_var("SW_HUB_ADDR", "127.0.0.1:9100");
    std::env::set_var("SW_WORKERS", "a:1, b:2,,");
    std::env::set_var("SW_SELECTION", "first");
    let config = Config::load();
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.hub.listen, "127.0.0.1:9100");
    assert_eq!(config.hub.workers, vec!["a:1".to_string(), "b:2".to_string()]);
    assert_eq!(config.hub.selection, SelectionPolicy::First);
    assert_eq!(config.reconnect_delay(), Duration::from_millis(100));
}

#[test]
#[serial]
fn bad_selection_env_is_a_config_error() {
    clear_env();
    std::env::set_var("SW_SELECTION", "round-robin");
    let result = Config::load();
    clear_env();
    assert!(matches!(result, Err(LifecycleError::Config(_))));
}

#[test]
#[serial]
fn zero_stage_timeout_disables_deadline() {
    clear_env();
    std::env::set_var("SW_STAGE_TIMEOUT_SECS", "0");
    let config = Config::load();
    clear_env();
    assert_eq!(config.unwrap().toolchain().timeout, None);
}
