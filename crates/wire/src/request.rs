// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use sw_core::{BuildProfile, JobId, JobKind, Requester};

/// Request from a client to the hub.
///
/// One request per connection. `GetStatus` and `Watch` keep the
/// connection open and stream until the client disconnects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Submit a build, rebuild, or clean job
    Submit {
        kind: JobKind,
        profile: BuildProfile,
        /// Toolchain-specific metadata, passed to the worker untouched
        #[serde(default)]
        platform_info: serde_json::Value,
        requester: Requester,
    },

    /// Subscribe to a job's progress: replays buffered events, then follows
    GetStatus { job_id: JobId },

    /// Subscribe to a change topic (no replay)
    Watch { topic: String },

    /// Announce a change at `path` under `scope` to exact and ancestor topics
    Announce {
        scope: String,
        path: String,
        #[serde(default)]
        payload: serde_json::Value,
    },

    /// List worker pool slots
    Workers,
}
