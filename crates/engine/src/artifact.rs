// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locating build output.

use std::path::{Path, PathBuf};

use sw_core::{BuildKind, BuildProfile, Platform};

use crate::error::StageError;

/// Glob patterns (relative to the project) tried in order for a build.
fn patterns(platform: &Platform, kind: BuildKind) -> Option<&'static [&'static str]> {
    match (platform, kind) {
        (Platform::Android, BuildKind::Debug) => Some(&["platforms/android/**/*-debug.apk"]),
        (Platform::Android, BuildKind::Release) => Some(&[
            "platforms/android/**/*-release-unsigned.apk",
            "platforms/android/**/*-release.apk",
        ]),
        (Platform::Ios, _) => Some(&["platforms/ios/build/**/*.ipa"]),
        _ => None,
    }
}

/// Find the artifact a build of `platform` left in `project`.
///
/// Browser builds produce a directory, `platforms/browser/www`. Walks the
/// filesystem synchronously; async callers go through [`find_artifact`].
pub fn locate_artifact(
    project: &Path,
    platform: &Platform,
    kind: BuildKind,
) -> Result<PathBuf, StageError> {
    if *platform == Platform::Browser {
        let www = project.join("platforms/browser/www");
        return if www.is_dir() {
            Ok(www)
        } else {
            Err(StageError::ArtifactMissing { pattern: "platforms/browser/www".to_string() })
        };
    }

    let Some(patterns) = patterns(platform, kind) else {
        return Err(StageError::Input(format!("no artifact pattern for platform {platform}")));
    };
    let base = glob::Pattern::escape(&project.to_string_lossy());
    for pattern in patterns {
        let full = format!("{base}/{pattern}");
        let paths = glob::glob(&full).map_err(|e| StageError::Tool(e.to_string()))?;
        let mut found: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
        found.sort();
        if let Some(first) = found.into_iter().next() {
            return Ok(first);
        }
    }
    Err(StageError::ArtifactMissing { pattern: patterns.join(" or ") })
}

/// [`locate_artifact`] on the blocking pool.
pub async fn find_artifact(
    project: PathBuf,
    platform: Platform,
    kind: BuildKind,
) -> Result<PathBuf, StageError> {
    tokio::task::spawn_blocking(move || locate_artifact(&project, &platform, kind))
        .await
        .map_err(|e| StageError::Tool(format!("artifact search: {e}")))?
}

/// Uploaded name: `<project>-<profile>-<kind>.<ext>`.
///
/// The extension comes from the artifact; a directory artifact uses its
/// own name (`www`).
pub fn artifact_filename(profile: &BuildProfile, artifact: &Path) -> String {
    let ext = artifact
        .extension()
        .or_else(|| artifact.file_name())
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bin".to_string());
    format!("{}-{}-{}.{}", profile.project, profile.name, profile.build, ext)
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
