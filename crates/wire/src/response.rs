// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use sw_core::{JobId, ProgressEvent};

/// One worker pool slot as reported by `Workers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerEntry {
    pub address: String,
    pub connected: bool,
    /// Jobs forwarded to this worker that have not reported a result yet
    pub outstanding: usize,
}

/// Response from the hub to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// A job was accepted by a worker
    Submitted { job_id: JobId },

    /// Subscription acknowledged; events follow
    Ready,

    /// One progress event for a `GetStatus` subscription
    Event { event: ProgressEvent },

    /// One message on a watched topic
    Topic { topic: String, payload: serde_json::Value },

    /// Change announced to this many subscribers
    Announced { delivered: usize },

    /// Worker pool slots
    Workers { workers: Vec<WorkerEntry> },

    /// Error response
    Error { message: String },
}
