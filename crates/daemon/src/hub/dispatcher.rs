// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher: places jobs on the pool and feeds their progress to the bridge.

use std::sync::Arc;

use sw_bridge::{BridgeError, ProgressBridge};
use sw_core::{BuildProfile, Job, JobId, JobKind, JobOutcome, ProgressEvent, Requester};
use sw_wire::WorkerEntry;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::link::ResultHandler;
use super::pool::WorkerPool;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no worker available")]
    NoWorkers,

    /// The worker link dropped before a result arrived; the real outcome is unknown.
    #[error("worker connection lost")]
    ConnectionLost,

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// A job accepted by a worker.
#[derive(Debug)]
pub struct Submission {
    pub job_id: JobId,
    pub result: oneshot::Receiver<Result<JobOutcome, DispatchError>>,
}

pub struct Dispatcher {
    pool: Arc<WorkerPool>,
    bridge: Arc<ProgressBridge>,
}

impl Dispatcher {
    /// `pool` should publish worker progress into `bridge`.
    pub fn new(pool: Arc<WorkerPool>, bridge: Arc<ProgressBridge>) -> Self {
        Self { pool, bridge }
    }

    pub fn bridge(&self) -> &Arc<ProgressBridge> {
        &self.bridge
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn workers(&self) -> Vec<WorkerEntry> {
        self.pool.workers()
    }

    pub fn build(
        &self,
        profile: BuildProfile,
        platform_info: serde_json::Value,
        requester: Requester,
    ) -> Result<Submission, DispatchError> {
        self.submit(JobKind::Build, profile, platform_info, requester)
    }

    pub fn rebuild(
        &self,
        profile: BuildProfile,
        platform_info: serde_json::Value,
        requester: Requester,
    ) -> Result<Submission, DispatchError> {
        self.submit(JobKind::Rebuild, profile, platform_info, requester)
    }

    pub fn clean(
        &self,
        profile: BuildProfile,
        requester: Requester,
    ) -> Result<Submission, DispatchError> {
        self.submit(JobKind::Clean, profile, serde_json::Value::Null, requester)
    }

    /// Allocate a job id, open its bridge buffer, and forward it.
    ///
    /// The buffer exists before the worker can emit anything, so a client
    /// subscribing with the returned id never misses an event.
    pub fn submit(
        &self,
        kind: JobKind,
        profile: BuildProfile,
        platform_info: serde_json::Value,
        requester: Requester,
    ) -> Result<Submission, DispatchError> {
        let job = Job::new(kind, profile, platform_info, requester);
        let job_id = job.id.clone();
        self.bridge.register_job(&job_id)?;

        let (tx, rx) = oneshot::channel();
        let bridge = Arc::clone(&self.bridge);
        let id = job_id.clone();
        let handler: ResultHandler = Box::new(move |result| {
            // Every job ends its stream, so followers never wait on a job
            // that will not report again.
            let event = match &result {
                Ok(outcome) => ProgressEvent::from_outcome(&id, outcome),
                Err(e) => ProgressEvent::aborted(&id, &format!("{e}; outcome unknown")),
            };
            if let Err(e) = bridge.publish(event) {
                warn!(job_id = %id, error = %e, "terminal event dropped");
            }
            let _ = tx.send(result);
        });

        if !self.pool.submit(job, handler) {
            self.bridge.discard(&job_id);
            return Err(DispatchError::NoWorkers);
        }
        info!(job_id = %job_id, %kind, "job dispatched");
        Ok(Submission { job_id, result: rx })
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
