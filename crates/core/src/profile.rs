// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build profiles: the immutable description of what a job builds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target platform for a build.
///
/// Known platforms get their own variant; anything else is carried through
/// verbatim so the toolchain can decide whether it supports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Android,
    Ios,
    Browser,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Browser => "browser",
            Platform::Other(name) => name,
        }
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        match s.as_str() {
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            "browser" => Platform::Browser,
            _ => Platform::Other(s),
        }
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        Platform::from(s.to_string())
    }
}

impl From<Platform> for String {
    fn from(p: Platform) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debug or release build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Debug,
    Release,
}

impl BuildKind {
    /// Flag passed to the build tool.
    pub fn flag(self) -> &'static str {
        match self {
            BuildKind::Debug => "--debug",
            BuildKind::Release => "--release",
        }
    }
}

crate::simple_display! {
    BuildKind {
        Debug => "debug",
        Release => "release",
    }
}

/// Resolved keystore record for a signed release.
///
/// Filled in by the caller (the façade resolves `SigningDescriptor::alias`)
/// before the job reaches a worker.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreInfo {
    /// Keystore file name; a signed release without one is rejected.
    #[serde(default)]
    pub filename: Option<String>,
    /// Location of the keystore in the artifact store. Defaults to
    /// `keystores/<filename>` when absent.
    #[serde(default)]
    pub remote_path: Option<String>,
    pub store_password: String,
    #[serde(default)]
    pub key_password: Option<String>,
    /// Key alias inside the keystore. Defaults to the descriptor alias.
    #[serde(default)]
    pub key_alias: Option<String>,
}

impl KeystoreInfo {
    /// The keystore filename, if present and non-blank.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }

    /// Where to fetch the keystore from.
    pub fn remote_path(&self) -> Option<String> {
        match &self.remote_path {
            Some(path) if !path.trim().is_empty() => Some(path.clone()),
            _ => self.filename().map(|f| format!("keystores/{f}")),
        }
    }
}

// Passwords never reach logs.
impl std::fmt::Debug for KeystoreInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoreInfo")
            .field("filename", &self.filename)
            .field("remote_path", &self.remote_path)
            .field("store_password", &"<redacted>")
            .field("key_password", &self.key_password.as_ref().map(|_| "<redacted>"))
            .field("key_alias", &self.key_alias)
            .finish()
    }
}

/// Signing request attached to a release profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningDescriptor {
    /// Keystore alias chosen by the user.
    pub alias: String,
    #[serde(default)]
    pub keystore: Option<KeystoreInfo>,
}

/// Errors from profile validation. These are user-input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("profile field `{field}` has an unsafe value: {value:?}")]
    UnsafeSegment { field: &'static str, value: String },
    #[error("plugin identifiers must not be empty")]
    EmptyPlugin,
}

/// Immutable description of what to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProfile {
    /// Profile name, part of the target key and the upload path.
    pub name: String,
    pub workspace: String,
    pub project: String,
    pub platform: Platform,
    pub build: BuildKind,
    /// Desired plugin identifiers, in order.
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub signing: Option<SigningDescriptor>,
}

impl BuildProfile {
    /// True when the pipeline must run the signing stage.
    pub fn is_signed_release(&self) -> bool {
        self.build == BuildKind::Release && self.signing.is_some()
    }

    /// Desired plugins with duplicates removed, first occurrence wins.
    pub fn plugin_set(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.plugins.iter().filter(|p| seen.insert(p.as_str())).cloned().collect()
    }

    /// Reject profiles that cannot name a working area.
    pub fn validate(&self) -> Result<(), ProfileError> {
        check_segment("name", &self.name)?;
        check_segment("workspace", &self.workspace)?;
        check_segment("project", &self.project)?;
        check_segment("platform", self.platform.as_str())?;
        if self.plugins.iter().any(|p| p.trim().is_empty()) {
            return Err(ProfileError::EmptyPlugin);
        }
        Ok(())
    }
}

/// A value used as one path component of the working area.
pub(crate) fn check_segment(field: &'static str, value: &str) -> Result<(), ProfileError> {
    if value.trim().is_empty() {
        return Err(ProfileError::EmptyField(field));
    }
    if value == "." || value == ".." || value.contains(['/', '\\', '\0']) {
        return Err(ProfileError::UnsafeSegment { field, value: value.to_string() });
    }
    Ok(())
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
