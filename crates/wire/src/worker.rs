// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages exchanged between the hub's dispatcher and a worker.

use serde::{Deserialize, Serialize};
use sw_core::{Job, JobId, JobOutcome, Stage, StatusCode};

/// Dispatcher → worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WorkerRequest {
    /// Version handshake, sent once when the link opens
    Hello { version: String },

    /// Liveness probe
    Ping,

    /// Run a job. `job.kind` selects the build, rebuild, or clean task.
    Submit { job: Job },
}

/// Worker → dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WorkerReply {
    /// Version handshake response
    Hello { version: String },

    Pong,

    /// The job entered `stage` (status code 1)
    Progress { job_id: JobId, stage: Stage },

    /// Terminal result (status code 0 or 2), exactly one per submitted job
    Result { job_id: JobId, status: StatusCode, outcome: JobOutcome },

    /// The worker could not decode or accept a request
    Error { message: String },
}

impl WorkerReply {
    pub fn result(job_id: JobId, outcome: JobOutcome) -> Self {
        WorkerReply::Result { job_id, status: outcome.status_code(), outcome }
    }

    /// Status code for job-scoped replies.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WorkerReply::Progress { .. } => Some(StatusCode::Progress),
            WorkerReply::Result { status, .. } => Some(*status),
            _ => None,
        }
    }
}
