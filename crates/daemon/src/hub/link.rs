// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One live connection to a worker and the jobs waiting on it.

use std::collections::HashMap;

use parking_lot::Mutex;
use sw_core::{Job, JobId, JobOutcome};
use sw_wire::WorkerRequest;
use tokio::sync::mpsc;

use super::dispatcher::DispatchError;

/// Completion callback for one forwarded job. Called exactly once.
pub type ResultHandler = Box<dyn FnOnce(Result<JobOutcome, DispatchError>) + Send>;

#[derive(Default)]
struct Pending {
    handlers: HashMap<JobId, ResultHandler>,
    closed: bool,
}

pub(crate) struct WorkerLink {
    address: String,
    tx: mpsc::UnboundedSender<WorkerRequest>,
    pending: Mutex<Pending>,
}

impl WorkerLink {
    pub(crate) fn new(address: impl Into<String>, tx: mpsc::UnboundedSender<WorkerRequest>) -> Self {
        Self { address: address.into(), tx, pending: Mutex::new(Pending::default()) }
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }

    /// Forward `job`, parking `handler` until its result arrives.
    ///
    /// Hands the handler back when the link is already closed.
    pub(crate) fn submit(&self, job: Job, handler: ResultHandler) -> Result<(), ResultHandler> {
        let mut pending = self.pending.lock();
        if pending.closed {
            return Err(handler);
        }
        let job_id = job.id.clone();
        pending.handlers.insert(job_id.clone(), handler);
        // Sent under the lock so fail_all cannot slip in between
        if self.tx.send(WorkerRequest::Submit { job }).is_err() {
            return match pending.handlers.remove(&job_id) {
                Some(handler) => Err(handler),
                None => Ok(()),
            };
        }
        Ok(())
    }

    /// Deliver a worker result. False if nothing was waiting for it.
    pub(crate) fn complete(&self, job_id: &JobId, outcome: JobOutcome) -> bool {
        let handler = self.pending.lock().handlers.remove(job_id);
        match handler {
            Some(handler) => {
                handler(Ok(outcome));
                true
            }
            None => false,
        }
    }

    /// Close the link and fail every outstanding job with `ConnectionLost`.
    pub(crate) fn fail_all(&self) -> usize {
        let handlers: Vec<ResultHandler> = {
            let mut pending = self.pending.lock();
            pending.closed = true;
            pending.handlers.drain().map(|(_, h)| h).collect()
        };
        let count = handlers.len();
        for handler in handlers {
            handler(Err(DispatchError::ConnectionLost));
        }
        count
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.pending.lock().handlers.len()
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
