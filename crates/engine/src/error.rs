// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use sw_adapters::{StoreError, ToolError};
use sw_core::{FailureKind, ProfileError, Stage};
use thiserror::Error;

/// Why a stage failed. The display string is the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("{0}")]
    Tool(String),

    #[error("{0}")]
    Input(String),

    #[error("signing failure: {0}")]
    Signing(String),

    #[error("verification failure: {0}")]
    Verification(String),

    #[error("alignment failure: {0}")]
    Alignment(String),

    #[error("no artifact matching {pattern}")]
    ArtifactMissing { pattern: String },

    #[error("clean failed: {0}")]
    Clean(String),

    #[error("cancelled before {0}")]
    Cancelled(Stage),
}

impl StageError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StageError::Input(_) => FailureKind::Input,
            StageError::Cancelled(_) => FailureKind::Cancelled,
            _ => FailureKind::Tool,
        }
    }
}

impl From<ToolError> for StageError {
    fn from(e: ToolError) -> Self {
        StageError::Tool(e.to_string())
    }
}

impl From<StoreError> for StageError {
    fn from(e: StoreError) -> Self {
        if e.is_input() {
            StageError::Input(e.to_string())
        } else {
            StageError::Tool(e.to_string())
        }
    }
}

impl From<ProfileError> for StageError {
    fn from(e: ProfileError) -> Self {
        StageError::Input(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
