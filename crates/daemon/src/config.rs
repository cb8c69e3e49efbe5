// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: optional TOML file, then `SW_*` overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sw_adapters::ToolchainConfig;

use crate::env;
use crate::hub::SelectionPolicy;
use crate::lifecycle::LifecycleError;

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub worker: WorkerConfig,
    pub hub: HubConfig,
    pub log: LogConfig,
    /// Handshake and one-shot request timeout
    pub ipc_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    pub listen: String,
    pub work_root: PathBuf,
    pub store_root: PathBuf,
    pub cordova: PathBuf,
    pub jarsigner: PathBuf,
    pub zipalign: PathBuf,
    pub unzip: PathBuf,
    /// Per-tool deadline; 0 waits forever
    pub stage_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    pub listen: String,
    pub workers: Vec<String>,
    pub reconnect_delay_ms: u64,
    pub selection: SelectionPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive
    pub filter: String,
    /// Daily-rolling log files go here when set
    pub dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker: WorkerConfig::default(),
            hub: HubConfig::default(),
            log: LogConfig::default(),
            ipc_timeout_ms: 5_000,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let tools = ToolchainConfig::default();
        Self {
            listen: "127.0.0.1:7301".to_string(),
            work_root: PathBuf::from("sw-work"),
            store_root: PathBuf::from("sw-store"),
            cordova: tools.cordova,
            jarsigner: tools.jarsigner,
            zipalign: tools.zipalign,
            unzip: tools.unzip,
            stage_timeout_secs: 0,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:7300".to_string(),
            workers: Vec::new(),
            reconnect_delay_ms: 2_000,
            selection: SelectionPolicy::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), dir: None }
    }
}

impl Config {
    /// Load `SW_CONFIG` (if set) and apply environment overrides.
    pub fn load() -> Result<Self, LifecycleError> {
        let mut config = match env::config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, LifecycleError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LifecycleError::ConfigRead(path.to_path_buf(), e))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, LifecycleError> {
        toml::from_str(text).map_err(|e| LifecycleError::Config(e.to_string()))
    }

    /// Environment variables win over file values.
    pub fn apply_env(&mut self) -> Result<(), LifecycleError> {
        if let Some(v) = env::worker_addr() {
            self.worker.listen = v;
        }
        if let Some(v) = env::work_root() {
            self.worker.work_root = v;
        }
        if let Some(v) = env::store_root() {
            self.worker.store_root = v;
        }
        if let Some(v) = env::cordova_bin() {
            self.worker.cordova = v;
        }
        if let Some(v) = env::jarsigner_bin() {
            self.worker.jarsigner = v;
        }
        if let Some(v) = env::zipalign_bin() {
            self.worker.zipalign = v;
        }
        if let Some(v) = env::unzip_bin() {
            self.worker.unzip = v;
        }
        if let Some(v) = env::stage_timeout_secs() {
            self.worker.stage_timeout_secs = v;
        }
        if let Some(v) = env::hub_addr() {
            self.hub.listen = v;
        }
        if let Some(v) = env::worker_addrs() {
            self.hub.workers = v;
        }
        if let Some(v) = env::reconnect_delay() {
            self.hub.reconnect_delay_ms = v.as_millis() as u64;
        }
        if let Some(v) = env::selection_policy() {
            self.hub.selection = v.parse().map_err(LifecycleError::Config)?;
        }
        if let Some(v) = env::ipc_timeout() {
            self.ipc_timeout_ms = v.as_millis() as u64;
        }
        if let Some(v) = env::log_filter() {
            self.log.filter = v;
        }
        if let Some(v) = env::log_dir() {
            self.log.dir = Some(v);
        }
        Ok(())
    }

    pub fn ipc_timeout(&self) -> Duration {
        Duration::from_millis(self.ipc_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.hub.reconnect_delay_ms)
    }

    pub fn toolchain(&self) -> ToolchainConfig {
        let w = &self.worker;
        ToolchainConfig {
            cordova: w.cordova.clone(),
            jarsigner: w.jarsigner.clone(),
            zipalign: w.zipalign.clone(),
            unzip: w.unzip.clone(),
            timeout: (w.stage_timeout_secs > 0).then(|| Duration::from_secs(w.stage_timeout_secs)),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
