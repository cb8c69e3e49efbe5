// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal job outcomes and the RPC status-code convention.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Reason reported when a job's target is already locked.
pub const ALREADY_RUNNING: &str = "the same target is already running";

/// Status code carried on worker replies.
///
/// `0` is terminal success, `1` a progress update, `2` terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StatusCode {
    Success,
    Progress,
    Failure,
}

impl StatusCode {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatusCode::Progress)
    }
}

impl From<StatusCode> for u8 {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Success => 0,
            StatusCode::Progress => 1,
            StatusCode::Failure => 2,
        }
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(StatusCode::Success),
            1 => Ok(StatusCode::Progress),
            2 => Ok(StatusCode::Failure),
            other => Err(format!("unknown status code {other}")),
        }
    }
}

/// Why a stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// An external tool failed; the reason carries its diagnostics.
    Tool,
    /// The request itself is malformed; retrying will not help.
    Input,
    /// The worker stopped the job between stages.
    Cancelled,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::Tool)
    }
}

crate::simple_display! {
    FailureKind {
        Tool => "tool",
        Input => "input",
        Cancelled => "cancelled",
    }
}

/// Terminal result of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The job finished. Builds carry the uploaded artifact name; cleans carry none.
    Succeeded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact: Option<String>,
    },
    /// A stage failed; later stages did not run.
    Failed { stage: Stage, kind: FailureKind, reason: String },
    /// The job never started because its target was locked.
    Aborted { reason: String },
}

impl JobOutcome {
    pub fn already_running() -> Self {
        JobOutcome::Aborted { reason: ALREADY_RUNNING.to_string() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            JobOutcome::Succeeded { .. } => StatusCode::Success,
            JobOutcome::Failed { .. } | JobOutcome::Aborted { .. } => StatusCode::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }

    /// Human-readable failure reason, shown verbatim to the requester.
    pub fn reason(&self) -> Option<&str> {
        match self {
            JobOutcome::Succeeded { .. } => None,
            JobOutcome::Failed { reason, .. } | JobOutcome::Aborted { reason } => Some(reason),
        }
    }
}

impl std::fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobOutcome::Succeeded { artifact: Some(name) } => write!(f, "succeeded: {name}"),
            JobOutcome::Succeeded { artifact: None } => f.write_str("succeeded"),
            JobOutcome::Failed { stage, reason, .. } => write!(f, "failed at {stage}: {reason}"),
            JobOutcome::Aborted { reason } => write!(f, "aborted: {reason}"),
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
