// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Packaging toolchain adapter.
//!
//! Every operation is an opaque external command that either succeeds or
//! fails with textual diagnostics.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sw_core::{BuildKind, KeystoreInfo, Platform};
use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{diagnostics, run_with_timeout, SubprocessError};

/// Errors from toolchain invocations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),

    /// Command ran and exited non-zero
    #[error("{command} failed: {diagnostics}")]
    Failed { command: String, diagnostics: String },

    #[error("{0}")]
    Io(String),
}

/// Adapter for the packaging toolchain
#[async_trait]
pub trait Toolchain: Clone + Send + Sync + 'static {
    /// Unpack a project archive into `dest`, creating it if needed.
    async fn extract_archive(&self, archive: &Path, dest: &Path) -> Result<(), ToolError>;

    /// Scaffold `platform` inside the project.
    async fn add_platform(&self, project: &Path, platform: &Platform) -> Result<(), ToolError>;

    /// Identifiers of plugins currently installed in the project.
    async fn installed_plugins(&self, project: &Path) -> Result<Vec<String>, ToolError>;

    async fn remove_plugins(&self, project: &Path, plugins: &[String]) -> Result<(), ToolError>;

    async fn add_plugins(&self, project: &Path, plugins: &[String]) -> Result<(), ToolError>;

    async fn build(
        &self,
        project: &Path,
        platform: &Platform,
        kind: BuildKind,
    ) -> Result<(), ToolError>;

    /// Sign `artifact` in place with the key `alias` from `keystore`.
    async fn sign(
        &self,
        artifact: &Path,
        keystore: &Path,
        alias: &str,
        info: &KeystoreInfo,
    ) -> Result<(), ToolError>;

    async fn verify(&self, artifact: &Path) -> Result<(), ToolError>;

    /// Write an aligned copy of `input` to `output`.
    async fn align(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// Binaries and limits for [`ShellToolchain`].
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub cordova: PathBuf,
    pub jarsigner: PathBuf,
    pub zipalign: PathBuf,
    pub unzip: PathBuf,
    /// Per-invocation deadline. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cordova: "cordova".into(),
            jarsigner: "jarsigner".into(),
            zipalign: "zipalign".into(),
            unzip: "unzip".into(),
            timeout: None,
        }
    }
}

/// Toolchain that shells out to the real binaries.
#[derive(Debug, Clone, Default)]
pub struct ShellToolchain {
    config: ToolchainConfig,
}

impl ShellToolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    async fn run(&self, mut cmd: Command, description: &str) -> Result<String, ToolError> {
        tracing::debug!(description, "running tool");
        cmd.stdin(std::process::Stdio::null());
        let output = run_with_timeout(cmd, self.config.timeout, description).await?;
        if !output.status.success() {
            return Err(ToolError::Failed {
                command: description.to_string(),
                diagnostics: diagnostics(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn cordova(&self, project: &Path) -> Command {
        let mut cmd = Command::new(&self.config.cordova);
        cmd.current_dir(project).arg("--no-telemetry");
        cmd
    }
}

#[async_trait]
impl Toolchain for ShellToolchain {
    async fn extract_archive(&self, archive: &Path, dest: &Path) -> Result<(), ToolError> {
        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|e| ToolError::Io(format!("create {}: {e}", dest.display())))?;
        let mut cmd = Command::new(&self.config.unzip);
        cmd.arg("-o").arg("-q").arg(archive).arg("-d").arg(dest);
        self.run(cmd, "unzip").await.map(drop)
    }

    async fn add_platform(&self, project: &Path, platform: &Platform) -> Result<(), ToolError> {
        let mut cmd = self.cordova(project);
        cmd.args(["platform", "add", platform.as_str()]);
        self.run(cmd, "cordova platform add").await.map(drop)
    }

    async fn installed_plugins(&self, project: &Path) -> Result<Vec<String>, ToolError> {
        let mut cmd = self.cordova(project);
        cmd.args(["plugin", "ls"]);
        let stdout = self.run(cmd, "cordova plugin ls").await?;
        Ok(parse_plugin_list(&stdout))
    }

    async fn remove_plugins(&self, project: &Path, plugins: &[String]) -> Result<(), ToolError> {
        let mut cmd = self.cordova(project);
        cmd.args(["plugin", "rm"]).args(plugins);
        self.run(cmd, "cordova plugin rm").await.map(drop)
    }

    async fn add_plugins(&self, project: &Path, plugins: &[String]) -> Result<(), ToolError> {
        let mut cmd = self.cordova(project);
        cmd.args(["plugin", "add"]).args(plugins);
        self.run(cmd, "cordova plugin add").await.map(drop)
    }

    async fn build(
        &self,
        project: &Path,
        platform: &Platform,
        kind: BuildKind,
    ) -> Result<(), ToolError> {
        let mut cmd = self.cordova(project);
        cmd.args(["build", platform.as_str(), kind.flag()]);
        self.run(cmd, "cordova build").await.map(drop)
    }

    async fn sign(
        &self,
        artifact: &Path,
        keystore: &Path,
        alias: &str,
        info: &KeystoreInfo,
    ) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.config.jarsigner);
        cmd.args(["-sigalg", "SHA1withRSA", "-digestalg", "SHA1"])
            .arg("-keystore")
            .arg(keystore)
            .arg("-storepass")
            .arg(&info.store_password);
        if let Some(key_password) = &info.key_password {
            cmd.arg("-keypass").arg(key_password);
        }
        cmd.arg(artifact).arg(alias);
        self.run(cmd, "jarsigner").await.map(drop)
    }

    async fn verify(&self, artifact: &Path) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.config.jarsigner);
        cmd.arg("-verify").arg(artifact);
        self.run(cmd, "jarsigner -verify").await.map(drop)
    }

    async fn align(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.config.zipalign);
        cmd.args(["-f", "4"]).arg(input).arg(output);
        self.run(cmd, "zipalign").await.map(drop)
    }
}

/// Parse `cordova plugin ls` output into plugin identifiers.
///
/// Each installed plugin is one line starting with its id, followed by the
/// version and a quoted display name.
pub fn parse_plugin_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("No plugins"))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Path, PathBuf, ToolError, Toolchain};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use sw_core::{BuildKind, KeystoreInfo, Platform};
    use tokio::sync::Notify;

    /// Recorded toolchain invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ToolCall {
        ExtractArchive { archive: PathBuf, dest: PathBuf },
        AddPlatform { platform: String },
        InstalledPlugins,
        RemovePlugins(Vec<String>),
        AddPlugins(Vec<String>),
        Build { platform: String, kind: BuildKind },
        Sign { artifact: PathBuf, alias: String },
        Verify { artifact: PathBuf },
        Align { input: PathBuf, output: PathBuf },
    }

    impl ToolCall {
        /// Operation name, as accepted by [`FakeToolchain::fail`].
        pub fn op(&self) -> &'static str {
            match self {
                ToolCall::ExtractArchive { .. } => "extract_archive",
                ToolCall::AddPlatform { .. } => "add_platform",
                ToolCall::InstalledPlugins => "installed_plugins",
                ToolCall::RemovePlugins(_) => "remove_plugins",
                ToolCall::AddPlugins(_) => "add_plugins",
                ToolCall::Build { .. } => "build",
                ToolCall::Sign { .. } => "sign",
                ToolCall::Verify { .. } => "verify",
                ToolCall::Align { .. } => "align",
            }
        }
    }

    #[derive(Default)]
    struct FakeToolchainState {
        calls: Vec<ToolCall>,
        installed: Vec<String>,
        failures: HashMap<&'static str, String>,
        build_gate: Option<Arc<Notify>>,
    }

    /// Fake toolchain for testing.
    ///
    /// Operations touch the filesystem the way the real tools would, so
    /// scaffold detection and artifact lookup work against it: extraction
    /// creates the project directory, platform add creates
    /// `platforms/<name>`, and build writes the platform's artifact.
    #[derive(Clone, Default)]
    pub struct FakeToolchain {
        inner: Arc<Mutex<FakeToolchainState>>,
        build_entered: Arc<Notify>,
    }

    impl FakeToolchain {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<ToolCall> {
            self.inner.lock().calls.clone()
        }

        /// Names of the recorded operations, in order.
        pub fn ops(&self) -> Vec<&'static str> {
            self.inner.lock().calls.iter().map(ToolCall::op).collect()
        }

        pub fn set_installed<I, S>(&self, plugins: I)
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.inner.lock().installed = plugins.into_iter().map(Into::into).collect();
        }

        pub fn installed(&self) -> Vec<String> {
            self.inner.lock().installed.clone()
        }

        /// Make operation `op` fail with `diagnostics`.
        pub fn fail(&self, op: &'static str, diagnostics: impl Into<String>) {
            self.inner.lock().failures.insert(op, diagnostics.into());
        }

        /// Block every subsequent build until the returned handle is notified.
        pub fn hold_builds(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.inner.lock().build_gate = Some(Arc::clone(&gate));
            gate
        }

        /// Resolves once a build has started.
        pub async fn build_started(&self) {
            self.build_entered.notified().await;
        }

        fn record(&self, call: ToolCall) -> Result<(), ToolError> {
            let mut state = self.inner.lock();
            let op = call.op();
            state.calls.push(call);
            match state.failures.get(op) {
                Some(diagnostics) => {
                    Err(ToolError::Failed { command: op.to_string(), diagnostics: diagnostics.clone() })
                }
                None => Ok(()),
            }
        }
    }

    async fn touch(path: &Path) -> Result<(), ToolError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| ToolError::Io(e.to_string()))?;
        }
        tokio::fs::write(path, b"fake").await.map_err(|e| ToolError::Io(e.to_string()))
    }

    /// Where the fake build writes its output.
    fn fake_artifact(project: &Path, platform: &Platform, kind: BuildKind) -> PathBuf {
        let platforms = project.join("platforms");
        match (platform, kind) {
            (Platform::Android, BuildKind::Debug) => {
                platforms.join("android/app/build/outputs/apk/debug/app-debug.apk")
            }
            (Platform::Android, BuildKind::Release) => {
                platforms.join("android/app/build/outputs/apk/release/app-release-unsigned.apk")
            }
            (Platform::Ios, _) => platforms.join("ios/build/device/App.ipa"),
            (Platform::Browser, _) => platforms.join("browser/www/index.html"),
            (Platform::Other(name), _) => platforms.join(name).join("build/output"),
        }
    }

    #[async_trait]
    impl Toolchain for FakeToolchain {
        async fn extract_archive(&self, archive: &Path, dest: &Path) -> Result<(), ToolError> {
            self.record(ToolCall::ExtractArchive {
                archive: archive.to_path_buf(),
                dest: dest.to_path_buf(),
            })?;
            touch(&dest.join("config.xml")).await
        }

        async fn add_platform(&self, project: &Path, platform: &Platform) -> Result<(), ToolError> {
            self.record(ToolCall::AddPlatform { platform: platform.to_string() })?;
            tokio::fs::create_dir_all(project.join("platforms").join(platform.as_str()))
                .await
                .map_err(|e| ToolError::Io(e.to_string()))
        }

        async fn installed_plugins(&self, _project: &Path) -> Result<Vec<String>, ToolError> {
            self.record(ToolCall::InstalledPlugins)?;
            Ok(self.installed())
        }

        async fn remove_plugins(&self, _project: &Path, plugins: &[String]) -> Result<(), ToolError> {
            self.record(ToolCall::RemovePlugins(plugins.to_vec()))?;
            self.inner.lock().installed.retain(|p| !plugins.contains(p));
            Ok(())
        }

        async fn add_plugins(&self, _project: &Path, plugins: &[String]) -> Result<(), ToolError> {
            self.record(ToolCall::AddPlugins(plugins.to_vec()))?;
            let mut state = self.inner.lock();
            for plugin in plugins {
                if !state.installed.contains(plugin) {
                    state.installed.push(plugin.clone());
                }
            }
            Ok(())
        }

        async fn build(
            &self,
            project: &Path,
            platform: &Platform,
            kind: BuildKind,
        ) -> Result<(), ToolError> {
            let gate = self.inner.lock().build_gate.clone();
            match gate {
                Some(gate) => {
                    // Register as a waiter before announcing entry so a
                    // release right after `build_started` is not missed.
                    let released = gate.notified();
                    tokio::pin!(released);
                    released.as_mut().enable();
                    self.build_entered.notify_one();
                    released.await;
                }
                None => self.build_entered.notify_one(),
            }
            self.record(ToolCall::Build { platform: platform.to_string(), kind })?;
            touch(&fake_artifact(project, platform, kind)).await
        }

        async fn sign(
            &self,
            artifact: &Path,
            _keystore: &Path,
            alias: &str,
            _info: &KeystoreInfo,
        ) -> Result<(), ToolError> {
            self.record(ToolCall::Sign { artifact: artifact.to_path_buf(), alias: alias.to_string() })
        }

        async fn verify(&self, artifact: &Path) -> Result<(), ToolError> {
            self.record(ToolCall::Verify { artifact: artifact.to_path_buf() })
        }

        async fn align(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
            self.record(ToolCall::Align { input: input.to_path_buf(), output: output.to_path_buf() })?;
            tokio::fs::copy(input, output).await.map(drop).map_err(|e| ToolError::Io(e.to_string()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeToolchain, ToolCall};

#[cfg(test)]
#[path = "toolchain_tests.rs"]
mod tests;
