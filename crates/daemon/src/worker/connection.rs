// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use sw_adapters::{ArtifactStore, Toolchain};
use sw_core::{EventKind, ProgressEvent, ProgressSink};
use sw_engine::Runner;
use sw_wire::{
    read_frame, read_frame_timeout, write_frame, write_frame_timeout, ProtocolError, WorkerReply,
    WorkerRequest, PROTOCOL_VERSION,
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::connection::ConnectionError;

/// Forwards stage entries to the dispatcher.
///
/// Terminal events are dropped: the `Result` reply carries the outcome.
pub(crate) struct ReplySink {
    tx: mpsc::UnboundedSender<WorkerReply>,
}

impl ReplySink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<WorkerReply>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ReplySink {
    fn publish(&self, event: ProgressEvent) {
        if event.kind != EventKind::Progress {
            return;
        }
        let Some(stage) = event.stage else {
            return;
        };
        // Send fails only once the link is gone; the job still runs to completion
        let _ = self.tx.send(WorkerReply::Progress { job_id: event.job_id, stage });
    }
}

/// Serve one dispatcher link until it closes.
pub(super) async fn serve<T: Toolchain, S: ArtifactStore>(
    stream: TcpStream,
    runner: Runner<T, S>,
    ipc_timeout: Duration,
) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    match read_frame_timeout::<_, WorkerRequest>(&mut reader, ipc_timeout).await? {
        WorkerRequest::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(peer_version = %version, "dispatcher protocol version differs");
            }
            let hello = WorkerReply::Hello { version: PROTOCOL_VERSION.to_string() };
            write_frame_timeout(&mut writer, &hello, ipc_timeout).await?;
        }
        other => {
            let reply = WorkerReply::Error { message: "expected Hello".to_string() };
            let _ = write_frame_timeout(&mut writer, &reply, ipc_timeout).await;
            return Err(ConnectionError::Handshake(format!("unexpected first request {other:?}")));
        }
    }

    // Job tasks and the read loop share one ordered outbound queue
    let (tx, mut rx) = mpsc::unbounded_channel::<WorkerReply>();
    tokio::spawn(async move {
        while let Some(reply) = rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &reply).await {
                debug!(error = %e, "dispatcher link write failed");
                break;
            }
        }
    });

    loop {
        let request = match read_frame::<_, WorkerRequest>(&mut reader).await {
            Ok(request) => request,
            Err(ProtocolError::Json(e)) => {
                let _ = tx.send(WorkerReply::Error { message: format!("bad request: {e}") });
                continue;
            }
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match request {
            WorkerRequest::Ping => {
                let _ = tx.send(WorkerReply::Pong);
            }
            WorkerRequest::Hello { .. } => {
                let _ = tx.send(WorkerReply::Hello { version: PROTOCOL_VERSION.to_string() });
            }
            WorkerRequest::Submit { job } => {
                debug!(job_id = %job.id, kind = %job.kind, "job received");
                let runner = runner.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let sink = ReplySink::new(tx.clone());
                    let outcome = runner.handle(&job, &sink).await;
                    let _ = tx.send(WorkerReply::result(job.id, outcome));
                });
            }
        }
    }
}
