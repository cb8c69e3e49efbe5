// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk working areas.

use std::io;
use std::path::{Path, PathBuf};

use sw_core::{JobId, TargetKey};

/// Directory layout under the worker's work root.
///
/// ```text
/// <root>/<requester>/<workspace>/<project>/<profile>   target working area
/// <root>/.scratch/<job-id>                             per-job downloads
/// ```
#[derive(Debug, Clone)]
pub struct WorkLayout {
    root: PathBuf,
}

impl WorkLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target_dir(&self, key: &TargetKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    pub fn scratch_dir(&self, job_id: &JobId) -> PathBuf {
        self.root.join(".scratch").join(job_id.as_str())
    }

    /// Remove a target's working area. An absent directory counts as
    /// removed; returns whether anything was deleted.
    pub async fn remove_target(&self, key: &TargetKey) -> io::Result<bool> {
        remove_dir_if_present(&self.target_dir(key)).await
    }
}

pub(crate) async fn remove_dir_if_present(path: &Path) -> io::Result<bool> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
