// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Every function returns `None` when its variable is unset or does not
//! parse, so the config layer can fall back to file values and defaults.

use std::path::PathBuf;
use std::time::Duration;

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn millis(name: &str) -> Option<Duration> {
    var(name).and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Optional TOML config file (`SW_CONFIG`)
pub fn config_path() -> Option<PathBuf> {
    var("SW_CONFIG").map(PathBuf::from)
}

/// Address the worker role listens on for dispatchers
pub fn worker_addr() -> Option<String> {
    var("SW_WORKER_ADDR")
}

/// Root of per-target working areas
pub fn work_root() -> Option<PathBuf> {
    var("SW_WORK_ROOT").map(PathBuf::from)
}

/// Root of the local artifact store
pub fn store_root() -> Option<PathBuf> {
    var("SW_STORE_ROOT").map(PathBuf::from)
}

pub fn cordova_bin() -> Option<PathBuf> {
    var("SW_CORDOVA").map(PathBuf::from)
}

pub fn jarsigner_bin() -> Option<PathBuf> {
    var("SW_JARSIGNER").map(PathBuf::from)
}

pub fn zipalign_bin() -> Option<PathBuf> {
    var("SW_ZIPALIGN").map(PathBuf::from)
}

pub fn unzip_bin() -> Option<PathBuf> {
    var("SW_UNZIP").map(PathBuf::from)
}

/// Per-tool-invocation deadline in seconds (`SW_STAGE_TIMEOUT_SECS`).
/// Zero disables the deadline.
pub fn stage_timeout_secs() -> Option<u64> {
    var("SW_STAGE_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok())
}

/// Address the hub role listens on for clients
pub fn hub_addr() -> Option<String> {
    var("SW_HUB_ADDR")
}

/// Comma-separated worker addresses the hub connects to
pub fn worker_addrs() -> Option<Vec<String>> {
    var("SW_WORKERS").map(|s| {
        s.split(',').map(str::trim).filter(|a| !a.is_empty()).map(str::to_string).collect()
    })
}

/// Delay between reconnect attempts (`SW_RECONNECT_DELAY_MS`)
pub fn reconnect_delay() -> Option<Duration> {
    millis("SW_RECONNECT_DELAY_MS")
}

/// Worker selection policy name (`first` or `least-loaded`)
pub fn selection_policy() -> Option<String> {
    var("SW_SELECTION")
}

/// Handshake and one-shot request timeout (`SW_IPC_TIMEOUT_MS`)
pub fn ipc_timeout() -> Option<Duration> {
    millis("SW_IPC_TIMEOUT_MS")
}

/// Log filter directive (`SW_LOG`)
pub fn log_filter() -> Option<String> {
    var("SW_LOG")
}

/// Directory for daily-rolling log files (`SW_LOG_DIR`)
pub fn log_dir() -> Option<PathBuf> {
    var("SW_LOG_DIR").map(PathBuf::from)
}
