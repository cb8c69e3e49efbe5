// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release signing: fetch keystore, sign, verify, align.

use std::path::{Path, PathBuf};

use sw_adapters::{ArtifactStore, Toolchain};
use sw_core::{Requester, SigningDescriptor};

use crate::error::StageError;

pub const INVALID_KEYSTORE: &str = "invalid keystore filename";

/// Sign `unsigned` and return the path of the aligned, signed artifact.
///
/// The keystore is checked before any tool runs; a missing filename is an
/// input error.
pub(crate) async fn sign_artifact<T: Toolchain, S: ArtifactStore>(
    tools: &T,
    store: &S,
    requester: &Requester,
    signing: &SigningDescriptor,
    unsigned: &Path,
    scratch: &Path,
) -> Result<PathBuf, StageError> {
    let info = signing
        .keystore
        .as_ref()
        .filter(|info| info.filename().is_some())
        .ok_or_else(|| StageError::Input(INVALID_KEYSTORE.to_string()))?;
    let remote = info
        .remote_path()
        .ok_or_else(|| StageError::Input(INVALID_KEYSTORE.to_string()))?;

    let keystore = store.fetch_file(requester, &remote, scratch).await.map_err(|e| {
        if e.is_input() {
            StageError::Input(format!("keystore unavailable: {e}"))
        } else {
            StageError::Signing(e.to_string())
        }
    })?;

    let alias = info.key_alias.as_deref().unwrap_or(&signing.alias);
    tools
        .sign(unsigned, &keystore, alias, info)
        .await
        .map_err(|e| StageError::Signing(e.to_string()))?;
    tools.verify(unsigned).await.map_err(|e| StageError::Verification(e.to_string()))?;

    let signed = signed_path(unsigned);
    tools
        .align(unsigned, &signed)
        .await
        .map_err(|e| StageError::Alignment(e.to_string()))?;
    Ok(signed)
}

/// `app-release-unsigned.apk` -> `app-release-signed.apk`, same directory.
fn signed_path(unsigned: &Path) -> PathBuf {
    let stem = unsigned.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = stem.strip_suffix("-unsigned").unwrap_or(&stem);
    let name = match unsigned.extension() {
        Some(ext) => format!("{stem}-signed.{}", ext.to_string_lossy()),
        None => format!("{stem}-signed"),
    };
    unsigned.with_file_name(name)
}

#[cfg(test)]
#[path = "signing_tests.rs"]
mod tests;
