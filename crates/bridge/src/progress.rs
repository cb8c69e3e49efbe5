// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job buffered progress delivery.

use std::collections::HashMap;

use parking_lot::Mutex;
use sw_core::{JobId, ProgressEvent, ProgressSink, SubscriberId};
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel a subscriber receives progress events on.
pub type EventSender = mpsc::UnboundedSender<ProgressEvent>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("invalid job id: {0}")]
    UnknownJob(JobId),

    #[error("job {0} is already registered")]
    AlreadyRegistered(JobId),
}

#[derive(Default)]
struct JobBuffer {
    /// Every event published for the job, in emission order. Never drained.
    events: Vec<ProgressEvent>,
    subscribers: HashMap<SubscriberId, EventSender>,
}

#[derive(Default)]
struct BridgeState {
    jobs: HashMap<JobId, JobBuffer>,
    /// Which job each subscriber is attached to.
    attached: HashMap<SubscriberId, JobId>,
}

/// Buffered pub-sub keyed by job id.
///
/// A job must be registered before its first stage runs. Publishing
/// appends to the job's buffer and forwards to live subscribers;
/// subscribing replays the whole buffer first. Replay and live delivery
/// happen under the same lock, so a subscriber sees events exactly in
/// emission order.
///
/// Buffers are kept for the life of the bridge.
#[derive(Default)]
pub struct ProgressBridge {
    state: Mutex<BridgeState>,
}

impl ProgressBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer for `job_id`.
    pub fn register_job(&self, job_id: &JobId) -> Result<(), BridgeError> {
        let mut state = self.state.lock();
        if state.jobs.contains_key(job_id) {
            return Err(BridgeError::AlreadyRegistered(job_id.clone()));
        }
        state.jobs.insert(job_id.clone(), JobBuffer::default());
        tracing::debug!(job_id = %job_id, "registered job with progress bridge");
        Ok(())
    }

    /// Drop a job's buffer and detach its subscribers.
    ///
    /// Only used when a job was registered but never admitted.
    pub fn discard(&self, job_id: &JobId) -> bool {
        let mut state = self.state.lock();
        match state.jobs.remove(job_id) {
            Some(buffer) => {
                for id in buffer.subscribers.keys() {
                    state.attached.remove(id);
                }
                true
            }
            None => false,
        }
    }

    /// Append `event` to its job's buffer and deliver it to live subscribers.
    ///
    /// Returns how many subscribers received it. Subscribers whose channel
    /// has closed are detached.
    pub fn publish(&self, event: ProgressEvent) -> Result<usize, BridgeError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let buffer = state
            .jobs
            .get_mut(&event.job_id)
            .ok_or_else(|| BridgeError::UnknownJob(event.job_id.clone()))?;

        let mut closed = Vec::new();
        for (id, tx) in &buffer.subscribers {
            if tx.send(event.clone()).is_err() {
                closed.push(id.clone());
            }
        }
        for id in &closed {
            buffer.subscribers.remove(id);
            state.attached.remove(id);
        }
        let delivered = buffer.subscribers.len();
        buffer.events.push(event);
        Ok(delivered)
    }

    /// Attach `subscriber` to `job_id` and replay the buffer to it.
    ///
    /// A subscriber follows one job at a time; attaching again moves it.
    /// Returns the number of replayed events.
    pub fn subscribe(
        &self,
        job_id: &JobId,
        subscriber: SubscriberId,
        tx: EventSender,
    ) -> Result<usize, BridgeError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if !state.jobs.contains_key(job_id) {
            return Err(BridgeError::UnknownJob(job_id.clone()));
        }

        if let Some(previous) = state.attached.remove(&subscriber) {
            if let Some(buffer) = state.jobs.get_mut(&previous) {
                buffer.subscribers.remove(&subscriber);
            }
        }

        let Some(buffer) = state.jobs.get_mut(job_id) else {
            return Err(BridgeError::UnknownJob(job_id.clone()));
        };
        let mut replayed = 0;
        for event in &buffer.events {
            if tx.send(event.clone()).is_err() {
                // Receiver already gone; nothing to attach.
                return Ok(replayed);
            }
            replayed += 1;
        }
        buffer.subscribers.insert(subscriber.clone(), tx);
        state.attached.insert(subscriber, job_id.clone());
        Ok(replayed)
    }

    /// Convenience: allocate a subscriber handle and channel, then subscribe.
    pub fn attach(
        &self,
        job_id: &JobId,
    ) -> Result<(SubscriberId, mpsc::UnboundedReceiver<ProgressEvent>), BridgeError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriberId::new();
        self.subscribe(job_id, id.clone(), tx)?;
        Ok((id, rx))
    }

    /// Detach `subscriber` from whichever job it follows.
    pub fn unsubscribe(&self, subscriber: &SubscriberId) -> bool {
        let mut state = self.state.lock();
        let Some(job_id) = state.attached.remove(subscriber) else {
            return false;
        };
        if let Some(buffer) = state.jobs.get_mut(&job_id) {
            buffer.subscribers.remove(subscriber);
        }
        true
    }

    pub fn is_registered(&self, job_id: &JobId) -> bool {
        self.state.lock().jobs.contains_key(job_id)
    }

    /// Snapshot of a job's buffered events.
    pub fn buffered(&self, job_id: &JobId) -> Option<Vec<ProgressEvent>> {
        self.state.lock().jobs.get(job_id).map(|b| b.events.clone())
    }

    pub fn subscriber_count(&self, job_id: &JobId) -> usize {
        self.state.lock().jobs.get(job_id).map_or(0, |b| b.subscribers.len())
    }
}

impl ProgressSink for ProgressBridge {
    fn publish(&self, event: ProgressEvent) {
        let job_id = event.job_id.clone();
        if let Err(e) = ProgressBridge::publish(self, event) {
            tracing::warn!(job_id = %job_id, error = %e, "dropping progress event");
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
