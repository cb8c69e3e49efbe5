// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress events and the sink the pipeline publishes them to.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::id::JobId;
use crate::outcome::{FailureKind, JobOutcome};
use crate::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// "I am now in stage X"
    Progress,
    Success,
    Failure,
    /// Rejected before any stage ran, or lost with its worker.
    Aborted,
}

crate::simple_display! {
    EventKind {
        Progress => "progress",
        Success => "success",
        Failure => "failure",
        Aborted => "aborted",
    }
}

/// One progress notification for a job.
///
/// `stage` is set for `Progress` and `Failure`; `payload` is free-form
/// (artifact name on success, reason and failure kind on failure, reason
/// when aborted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ProgressEvent {
    pub fn progress(job_id: &JobId, stage: Stage) -> Self {
        Self {
            job_id: job_id.clone(),
            kind: EventKind::Progress,
            stage: Some(stage),
            payload: serde_json::Value::Null,
        }
    }

    pub fn success(job_id: &JobId, artifact: Option<&str>) -> Self {
        Self {
            job_id: job_id.clone(),
            kind: EventKind::Success,
            stage: None,
            payload: serde_json::json!({ "artifact": artifact }),
        }
    }

    pub fn failure(job_id: &JobId, stage: Stage, kind: FailureKind, reason: &str) -> Self {
        Self {
            job_id: job_id.clone(),
            kind: EventKind::Failure,
            stage: Some(stage),
            payload: serde_json::json!({ "reason": reason, "kind": kind }),
        }
    }

    pub fn aborted(job_id: &JobId, reason: &str) -> Self {
        Self {
            job_id: job_id.clone(),
            kind: EventKind::Aborted,
            stage: None,
            payload: serde_json::json!({ "reason": reason }),
        }
    }

    /// Terminal event for an outcome.
    pub fn from_outcome(job_id: &JobId, outcome: &JobOutcome) -> Self {
        match outcome {
            JobOutcome::Succeeded { artifact } => Self::success(job_id, artifact.as_deref()),
            JobOutcome::Failed { stage, kind, reason } => {
                Self::failure(job_id, *stage, *kind, reason)
            }
            JobOutcome::Aborted { reason } => Self::aborted(job_id, reason),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind != EventKind::Progress
    }

    /// Terminal events that should make a follower exit non-zero.
    pub fn is_unsuccessful(&self) -> bool {
        matches!(self.kind, EventKind::Failure | EventKind::Aborted)
    }
}

/// Destination for a job's progress events.
///
/// Implemented by the in-process progress bridge, by the worker's RPC
/// connection, and by test recorders.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn publish(&self, event: ProgressEvent) {
        (**self).publish(event)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use super::{ProgressEvent, ProgressSink};
    use crate::stage::Stage;
    use parking_lot::Mutex;

    /// Sink that records every event, for tests.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ProgressEvent> {
            self.events.lock().clone()
        }

        /// Stages of the recorded `Progress` events, in order.
        pub fn stages(&self) -> Vec<Stage> {
            self.events
                .lock()
                .iter()
                .filter(|e| !e.is_terminal())
                .filter_map(|e| e.stage)
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn publish(&self, event: ProgressEvent) {
            self.events.lock().push(event);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use recording::RecordingSink;

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
