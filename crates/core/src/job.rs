// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs and the target keys that serialize them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::id::JobId;
use crate::profile::{check_segment, BuildProfile, ProfileError};

/// What a job asks the worker to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Build,
    Rebuild,
    Clean,
}

crate::simple_display! {
    JobKind {
        Build => "build",
        Rebuild => "rebuild",
        Clean => "clean",
    }
}

/// Identity and credential of whoever submitted a job.
///
/// The credential is handed to the artifact store untouched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl Requester {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), credential: None }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

impl std::fmt::Debug for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requester")
            .field("id", &self.id)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One build, rebuild, or clean request with a fixed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub profile: BuildProfile,
    /// Toolchain-specific metadata, passed through opaquely.
    #[serde(default)]
    pub platform_info: serde_json::Value,
    pub requester: Requester,
}

impl Job {
    /// Create a job with a freshly allocated id.
    pub fn new(
        kind: JobKind,
        profile: BuildProfile,
        platform_info: serde_json::Value,
        requester: Requester,
    ) -> Self {
        Self { id: JobId::new(), kind, profile, platform_info, requester }
    }

    /// Derive the working-area key, validating every component.
    pub fn target_key(&self) -> Result<TargetKey, ProfileError> {
        check_segment("requester", &self.requester.id)?;
        self.profile.validate()?;
        Ok(TargetKey {
            requester: self.requester.id.clone(),
            workspace: self.profile.workspace.clone(),
            project: self.profile.project.clone(),
            profile: self.profile.name.clone(),
        })
    }
}

/// Identifies the on-disk working area a job uses.
///
/// Two jobs with the same key never execute concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetKey {
    pub requester: String,
    pub workspace: String,
    pub project: String,
    pub profile: String,
}

impl TargetKey {
    /// Working-area path relative to the worker's work root.
    pub fn relative_path(&self) -> PathBuf {
        [&self.requester, &self.workspace, &self.project, &self.profile].iter().collect()
    }
}

impl std::fmt::Display for TargetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}/{}", self.requester, self.workspace, self.project, self.profile)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod builder {
    use super::{Job, JobKind, Requester};
    use crate::id::JobId;
    use crate::profile::{BuildKind, BuildProfile, KeystoreInfo, Platform, SigningDescriptor};

    /// Test builder for [`Job`] with sensible debug-build defaults.
    pub struct JobBuilder {
        id: JobId,
        kind: JobKind,
        requester: String,
        profile: BuildProfile,
        platform_info: serde_json::Value,
    }

    impl Default for JobBuilder {
        fn default() -> Self {
            Self {
                id: JobId::new(),
                kind: JobKind::Build,
                requester: "alice".to_string(),
                profile: BuildProfile {
                    name: "default".to_string(),
                    workspace: "ws".to_string(),
                    project: "app".to_string(),
                    platform: Platform::Android,
                    build: BuildKind::Debug,
                    plugins: Vec::new(),
                    signing: None,
                },
                platform_info: serde_json::Value::Null,
            }
        }
    }

    impl JobBuilder {
        pub fn id(mut self, id: impl Into<JobId>) -> Self {
            self.id = id.into();
            self
        }

        pub fn kind(mut self, kind: JobKind) -> Self {
            self.kind = kind;
            self
        }

        pub fn requester(mut self, requester: impl Into<String>) -> Self {
            self.requester = requester.into();
            self
        }

        pub fn profile_name(mut self, name: impl Into<String>) -> Self {
            self.profile.name = name.into();
            self
        }

        pub fn project(mut self, project: impl Into<String>) -> Self {
            self.profile.project = project.into();
            self
        }

        pub fn platform(mut self, platform: Platform) -> Self {
            self.profile.platform = platform;
            self
        }

        pub fn release(mut self) -> Self {
            self.profile.build = BuildKind::Release;
            self
        }

        pub fn plugins<I, S>(mut self, plugins: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.profile.plugins = plugins.into_iter().map(Into::into).collect();
            self
        }

        /// Attach a signing descriptor with the given keystore filename.
        pub fn signing(mut self, filename: Option<&str>) -> Self {
            self.profile.signing = Some(SigningDescriptor {
                alias: "upload".to_string(),
                keystore: Some(KeystoreInfo {
                    filename: filename.map(str::to_string),
                    remote_path: None,
                    store_password: "storepass".to_string(),
                    key_password: None,
                    key_alias: None,
                }),
            });
            self
        }

        pub fn platform_info(mut self, info: serde_json::Value) -> Self {
            self.platform_info = info;
            self
        }

        pub fn build(self) -> Job {
            Job {
                id: self.id,
                kind: self.kind,
                profile: self.profile,
                platform_info: self.platform_info,
                requester: Requester::new(self.requester),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use builder::JobBuilder;

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
