// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pool: one slot per configured worker, each kept connected by
//! its own task.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use sw_core::{Job, ProgressEvent, ProgressSink};
use sw_wire::{
    read_frame, read_frame_timeout, write_frame, write_frame_timeout, ProtocolError, WorkerEntry,
    WorkerReply, WorkerRequest, PROTOCOL_VERSION,
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::link::{ResultHandler, WorkerLink};
use super::selection::SelectionPolicy;
use crate::connection::ConnectionError;

/// How long shutdown waits for each connection task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Pool tuning.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub policy: SelectionPolicy,
    pub reconnect_delay: Duration,
    /// Bounds connect and the Hello exchange
    pub ipc_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            reconnect_delay: Duration::from_secs(2),
            ipc_timeout: Duration::from_secs(5),
        }
    }
}

struct WorkerSlot {
    address: String,
    /// Present only between a completed handshake and the link dropping
    link: RwLock<Option<Arc<WorkerLink>>>,
}

impl WorkerSlot {
    fn current(&self) -> Option<Arc<WorkerLink>> {
        self.link.read().clone()
    }

    fn detach(&self) {
        let link = self.link.write().take();
        if let Some(link) = link {
            let failed = link.fail_all();
            if failed > 0 {
                warn!(worker = %self.address, failed, "worker link lost with jobs outstanding");
            }
        }
    }
}

/// Set of worker connections the dispatcher places jobs on.
pub struct WorkerPool {
    slots: RwLock<Vec<Arc<WorkerSlot>>>,
    options: PoolOptions,
    sink: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Worker `Progress` replies are published to `sink`.
    pub fn new(sink: Arc<dyn ProgressSink>, options: PoolOptions) -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            options,
            sink,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Add a slot for `address` and start keeping it connected.
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect(&self, address: impl Into<String>) {
        let slot = Arc::new(WorkerSlot { address: address.into(), link: RwLock::new(None) });
        self.slots.write().push(Arc::clone(&slot));
        let task = tokio::spawn(maintain(
            slot,
            Arc::clone(&self.sink),
            self.options,
            self.cancel.child_token(),
        ));
        self.tasks.lock().push(task);
    }

    /// Forward `job` to a connected worker chosen by the selection policy.
    ///
    /// Returns false, dropping `handler` uncalled, when no worker is
    /// connected.
    pub fn submit(&self, job: Job, handler: ResultHandler) -> bool {
        let links: Vec<Arc<WorkerLink>> =
            self.slots.read().iter().filter_map(|slot| slot.current()).collect();
        let loads: Vec<usize> = links.iter().map(|l| l.outstanding()).collect();

        let mut handler = handler;
        for index in self.options.policy.rank(&loads) {
            let link = &links[index];
            match link.submit(job.clone(), handler) {
                Ok(()) => {
                    debug!(job_id = %job.id, worker = %link.address(), "job forwarded");
                    return true;
                }
                // Link closed after the snapshot; try the next one
                Err(returned) => handler = returned,
            }
        }
        false
    }

    pub fn workers(&self) -> Vec<WorkerEntry> {
        self.slots
            .read()
            .iter()
            .map(|slot| {
                let link = slot.current();
                WorkerEntry {
                    address: slot.address.clone(),
                    connected: link.is_some(),
                    outstanding: link.map_or(0, |l| l.outstanding()),
                }
            })
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.slots.read().iter().filter(|s| s.link.read().is_some()).count()
    }

    /// Stop every connection task. Outstanding jobs see `ConnectionLost`.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err() {
                warn!("worker connection task did not stop in time");
            }
        }
        info!("worker pool shut down");
    }
}

/// Connect, serve, and reconnect on a fixed delay until cancelled.
async fn maintain(
    slot: Arc<WorkerSlot>,
    sink: Arc<dyn ProgressSink>,
    options: PoolOptions,
    cancel: CancellationToken,
) {
    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => None,
            result = run_link(&slot, sink.as_ref(), options.ipc_timeout) => Some(result),
        };
        slot.detach();

        match result {
            None => break,
            Some(Ok(())) => info!(worker = %slot.address, "worker closed the link"),
            Some(Err(ConnectionError::Protocol(ProtocolError::ConnectionClosed))) => {
                info!(worker = %slot.address, "worker disconnected")
            }
            Some(Err(e)) => warn!(worker = %slot.address, error = %e, "worker link failed"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(options.reconnect_delay) => {
                debug!(worker = %slot.address, "reconnecting");
            }
        }
    }
    debug!(worker = %slot.address, "connection task stopped");
}

/// One connection lifetime: handshake, then pump frames both ways.
async fn run_link(
    slot: &WorkerSlot,
    sink: &dyn ProgressSink,
    ipc_timeout: Duration,
) -> Result<(), ConnectionError> {
    let stream = tokio::time::timeout(ipc_timeout, TcpStream::connect(slot.address.as_str()))
        .await
        .map_err(|_| ProtocolError::Timeout)?
        .map_err(ProtocolError::Io)?;
    let (mut reader, mut writer) = stream.into_split();

    let hello = WorkerRequest::Hello { version: PROTOCOL_VERSION.to_string() };
    write_frame_timeout(&mut writer, &hello, ipc_timeout).await?;
    match read_frame_timeout::<_, WorkerReply>(&mut reader, ipc_timeout).await? {
        WorkerReply::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(worker = %slot.address, peer_version = %version, "worker protocol version differs");
            }
        }
        other => {
            return Err(ConnectionError::Handshake(format!("expected Hello, got {other:?}")));
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<WorkerRequest>();
    let link = Arc::new(WorkerLink::new(slot.address.clone(), tx));
    *slot.link.write() = Some(Arc::clone(&link));
    info!(worker = %slot.address, "worker connected");

    let write_loop = async {
        while let Some(request) = rx.recv().await {
            write_frame(&mut writer, &request).await?;
        }
        Ok::<(), ProtocolError>(())
    };

    let read_loop = async {
        loop {
            let reply = match read_frame::<_, WorkerReply>(&mut reader).await {
                Ok(reply) => reply,
                Err(e) => break Err::<(), ProtocolError>(e),
            };
            match reply {
                WorkerReply::Progress { job_id, stage } => {
                    sink.publish(ProgressEvent::progress(&job_id, stage));
                }
                WorkerReply::Result { job_id, outcome, .. } => {
                    if !link.complete(&job_id, outcome) {
                        warn!(worker = %slot.address, job_id = %job_id, "result for unknown job");
                    }
                }
                WorkerReply::Error { message } => {
                    warn!(worker = %slot.address, message = %message, "worker reported error");
                }
                WorkerReply::Pong | WorkerReply::Hello { .. } => {}
            }
        }
    };

    tokio::select! {
        result = write_loop => result?,
        result = read_loop => result?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
