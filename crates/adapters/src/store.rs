// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact store adapter: project sources in, packages out.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use sw_core::Requester;
use thiserror::Error;

/// Errors from artifact store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether the failure is the caller's fault rather than the store's.
    pub fn is_input(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::InvalidPath(_))
    }
}

/// Adapter for the external file service holding sources and packages
#[async_trait]
pub trait ArtifactStore: Clone + Send + Sync + 'static {
    /// Copy the project's source archive into `dest_dir`; returns its local path.
    async fn fetch_project_archive(
        &self,
        requester: &Requester,
        workspace: &str,
        project: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, StoreError>;

    /// Copy a single file (e.g. a keystore) into `dest_dir`; returns its local path.
    async fn fetch_file(
        &self,
        requester: &Requester,
        remote_path: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, StoreError>;

    /// Upload `local` (file or directory) as `<remote_dir>/<filename>`.
    /// Returns the remote path it was stored under.
    async fn upload_artifact(
        &self,
        requester: &Requester,
        local: &Path,
        remote_dir: &str,
        filename: &str,
    ) -> Result<String, StoreError>;
}

/// Reject absolute paths and parent components in a store-relative path.
fn relative(path: &str) -> Result<PathBuf, StoreError> {
    let candidate = Path::new(path);
    let safe = !path.is_empty()
        && candidate.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if safe {
        Ok(candidate.to_path_buf())
    } else {
        Err(StoreError::InvalidPath(path.to_string()))
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.display().to_string(), source }
}

/// Artifact store backed by a local directory tree.
///
/// ```text
/// <root>/<requester>/<workspace>/<project>.zip      project sources
/// <root>/<requester>/<remote_path>                  other files
/// <root>/<requester>/packages/<remote_dir>/<name>   uploaded packages
/// ```
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn requester_root(&self, requester: &Requester) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(relative(&requester.id)?))
    }

    async fn copy_in(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf, StoreError> {
        if !tokio::fs::try_exists(source).await.map_err(io_err(source))? {
            return Err(StoreError::NotFound(source.display().to_string()));
        }
        let name = source
            .file_name()
            .ok_or_else(|| StoreError::InvalidPath(source.display().to_string()))?;
        tokio::fs::create_dir_all(dest_dir).await.map_err(io_err(dest_dir))?;
        let dest = dest_dir.join(name);
        tokio::fs::copy(source, &dest).await.map_err(io_err(source))?;
        Ok(dest)
    }
}

/// Recursively copy a directory.
async fn copy_dir(from: &Path, to: &Path) -> Result<(), StoreError> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];
    while let Some((src, dst)) = pending.pop() {
        tokio::fs::create_dir_all(&dst).await.map_err(io_err(&dst))?;
        let mut entries = tokio::fs::read_dir(&src).await.map_err(io_err(&src))?;
        while let Some(entry) = entries.next_entry().await.map_err(io_err(&src))? {
            let path = entry.path();
            let target = dst.join(entry.file_name());
            if entry.file_type().await.map_err(io_err(&path))?.is_dir() {
                pending.push((path, target));
            } else {
                tokio::fs::copy(&path, &target).await.map_err(io_err(&path))?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn fetch_project_archive(
        &self,
        requester: &Requester,
        workspace: &str,
        project: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, StoreError> {
        let source = self
            .requester_root(requester)?
            .join(relative(workspace)?)
            .join(format!("{}.zip", relative(project)?.display()));
        self.copy_in(&source, dest_dir).await
    }

    async fn fetch_file(
        &self,
        requester: &Requester,
        remote_path: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, StoreError> {
        let source = self.requester_root(requester)?.join(relative(remote_path)?);
        self.copy_in(&source, dest_dir).await
    }

    async fn upload_artifact(
        &self,
        requester: &Requester,
        local: &Path,
        remote_dir: &str,
        filename: &str,
    ) -> Result<String, StoreError> {
        let file = relative(filename)?;
        if file.components().count() != 1 {
            return Err(StoreError::InvalidPath(filename.to_string()));
        }
        let dir = self.requester_root(requester)?.join("packages").join(relative(remote_dir)?);
        tokio::fs::create_dir_all(&dir).await.map_err(io_err(&dir))?;
        let dest = dir.join(&file);

        let metadata = tokio::fs::metadata(local).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(local.display().to_string())
            } else {
                StoreError::Io { path: local.display().to_string(), source }
            }
        })?;
        if metadata.is_dir() {
            copy_dir(local, &dest).await?;
        } else {
            tokio::fs::copy(local, &dest).await.map_err(io_err(local))?;
        }
        tracing::info!(requester = %requester.id, path = %dest.display(), "uploaded artifact");
        Ok(format!("{remote_dir}/{filename}"))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ArtifactStore, Path, PathBuf, StoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use sw_core::Requester;

    /// Recorded store invocation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum StoreCall {
        FetchProjectArchive { requester: String, workspace: String, project: String },
        FetchFile { requester: String, remote_path: String },
        Upload { requester: String, local: PathBuf, remote_dir: String, filename: String },
    }

    #[derive(Default)]
    struct FakeStoreState {
        calls: Vec<StoreCall>,
        missing: Vec<String>,
        failures: HashMap<&'static str, String>,
    }

    /// Fake artifact store for testing. Fetches write placeholder files.
    #[derive(Clone, Default)]
    pub struct FakeArtifactStore {
        inner: Arc<Mutex<FakeStoreState>>,
    }

    impl FakeArtifactStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<StoreCall> {
            self.inner.lock().calls.clone()
        }

        /// Report `remote_path` (or `<workspace>/<project>.zip`) as not found.
        pub fn set_missing(&self, remote_path: impl Into<String>) {
            self.inner.lock().missing.push(remote_path.into());
        }

        /// Make operation `op` (`fetch_project_archive`, `fetch_file`,
        /// `upload_artifact`) fail with an io error carrying `message`.
        pub fn fail(&self, op: &'static str, message: impl Into<String>) {
            self.inner.lock().failures.insert(op, message.into());
        }

        /// Uploaded `(remote_dir, filename)` pairs, in order.
        pub fn uploads(&self) -> Vec<(String, String)> {
            self.inner
                .lock()
                .calls
                .iter()
                .filter_map(|c| match c {
                    StoreCall::Upload { remote_dir, filename, .. } => {
                        Some((remote_dir.clone(), filename.clone()))
                    }
                    _ => None,
                })
                .collect()
        }

        fn record(&self, op: &'static str, call: StoreCall, key: &str) -> Result<(), StoreError> {
            let mut state = self.inner.lock();
            state.calls.push(call);
            if let Some(message) = state.failures.get(op) {
                return Err(StoreError::Io {
                    path: key.to_string(),
                    source: std::io::Error::other(message.clone()),
                });
            }
            if state.missing.iter().any(|m| m == key) {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Ok(())
        }
    }

    async fn placeholder(dest_dir: &Path, name: &str) -> Result<PathBuf, StoreError> {
        let io = |source| StoreError::Io { path: dest_dir.display().to_string(), source };
        tokio::fs::create_dir_all(dest_dir).await.map_err(io)?;
        let path = dest_dir.join(name);
        tokio::fs::write(&path, b"fake").await.map_err(io)?;
        Ok(path)
    }

    #[async_trait]
    impl ArtifactStore for FakeArtifactStore {
        async fn fetch_project_archive(
            &self,
            requester: &Requester,
            workspace: &str,
            project: &str,
            dest_dir: &Path,
        ) -> Result<PathBuf, StoreError> {
            let key = format!("{workspace}/{project}.zip");
            self.record(
                "fetch_project_archive",
                StoreCall::FetchProjectArchive {
                    requester: requester.id.clone(),
                    workspace: workspace.to_string(),
                    project: project.to_string(),
                },
                &key,
            )?;
            placeholder(dest_dir, &format!("{project}.zip")).await
        }

        async fn fetch_file(
            &self,
            requester: &Requester,
            remote_path: &str,
            dest_dir: &Path,
        ) -> Result<PathBuf, StoreError> {
            self.record(
                "fetch_file",
                StoreCall::FetchFile {
                    requester: requester.id.clone(),
                    remote_path: remote_path.to_string(),
                },
                remote_path,
            )?;
            let name = Path::new(remote_path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            placeholder(dest_dir, &name).await
        }

        async fn upload_artifact(
            &self,
            requester: &Requester,
            local: &Path,
            remote_dir: &str,
            filename: &str,
        ) -> Result<String, StoreError> {
            let remote = format!("{remote_dir}/{filename}");
            self.record(
                "upload_artifact",
                StoreCall::Upload {
                    requester: requester.id.clone(),
                    local: local.to_path_buf(),
                    remote_dir: remote_dir.to_string(),
                    filename: filename.to_string(),
                },
                &remote,
            )?;
            Ok(remote)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeArtifactStore, StoreCall};

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
