// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-facing listener: one request per connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sw_bridge::ChannelHub;
use sw_core::{JobId, SubscriberId};
use sw_wire::{read_frame_timeout, write_frame, write_frame_timeout, Request, Response, PROTOCOL_VERSION};
use tokio::io::AsyncRead;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::dispatcher::Dispatcher;
use crate::connection::{detect_client_disconnect, log_connection_error, ConnectionError};
use crate::lifecycle::LifecycleError;

/// Shared state for all client connections.
pub struct HubCtx {
    pub dispatcher: Dispatcher,
    pub channels: Arc<ChannelHub>,
    pub ipc_timeout: Duration,
}

pub struct HubListener {
    listener: TcpListener,
    ctx: Arc<HubCtx>,
}

impl HubListener {
    pub async fn bind(addr: &str, ctx: Arc<HubCtx>) -> Result<Self, LifecycleError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| LifecycleError::BindFailed(addr.to_string(), e))?;
        Ok(Self { listener, ctx })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn ctx(&self) -> &Arc<HubCtx> {
        &self.ctx
    }

    /// Accept clients until `shutdown` fires, spawning a task per connection.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(addr = ?self.listener.local_addr().ok(), "hub listening");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.listener.accept() => match result {
                    Ok((stream, peer)) => {
                        debug!(%peer, "client connected");
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &ctx).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("accept error: {}", e),
                },
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, ctx: &HubCtx) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();
    let request: Request = read_frame_timeout(&mut reader, ctx.ipc_timeout).await?;

    if matches!(request, Request::Ping | Request::Workers) {
        debug!(request = ?request, "received request");
    } else {
        info!(request = ?request, "received request");
    }

    let response = match request {
        Request::GetStatus { job_id } => return stream_job(job_id, reader, writer, ctx).await,
        Request::Watch { topic } => return stream_topic(topic, reader, writer, ctx).await,

        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client_version = %version, "client protocol version differs");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::Submit { kind, profile, platform_info, requester } => {
            match ctx.dispatcher.submit(kind, profile, platform_info, requester) {
                Ok(submission) => {
                    let job_id = submission.job_id.clone();
                    tokio::spawn(async move {
                        match submission.result.await {
                            Ok(Ok(outcome)) => {
                                debug!(job_id = %submission.job_id, %outcome, "job finished")
                            }
                            Ok(Err(e)) => {
                                warn!(job_id = %submission.job_id, error = %e, "job lost")
                            }
                            Err(_) => debug!(job_id = %submission.job_id, "result dropped"),
                        }
                    });
                    Response::Submitted { job_id }
                }
                Err(e) => Response::Error { message: e.to_string() },
            }
        }

        Request::Announce { scope, path, payload } => {
            let delivered = ctx.channels.notify_change(&scope, &path, payload);
            Response::Announced { delivered }
        }

        Request::Workers => Response::Workers { workers: ctx.dispatcher.workers() },
    };

    write_frame_timeout(&mut writer, &response, ctx.ipc_timeout).await?;
    Ok(())
}

/// Replay the job's buffer, then follow it until the client leaves.
async fn stream_job<R: AsyncRead + Unpin>(
    job_id: JobId,
    mut reader: R,
    mut writer: OwnedWriteHalf,
    ctx: &HubCtx,
) -> Result<(), ConnectionError> {
    let bridge = ctx.dispatcher.bridge();
    let (subscriber, mut rx) = match bridge.attach(&job_id) {
        Ok(attached) => attached,
        Err(e) => {
            let response = Response::Error { message: e.to_string() };
            write_frame_timeout(&mut writer, &response, ctx.ipc_timeout).await?;
            return Ok(());
        }
    };

    let result = async {
        write_frame_timeout(&mut writer, &Response::Ready, ctx.ipc_timeout).await?;
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => write_frame(&mut writer, &Response::Event { event }).await?,
                    None => break,
                },
                _ = detect_client_disconnect(&mut reader) => break,
            }
        }
        Ok::<(), ConnectionError>(())
    }
    .await;

    bridge.unsubscribe(&subscriber);
    debug!(job_id = %job_id, %subscriber, "status subscriber left");
    result
}

/// Follow a topic until the client leaves. Nothing is replayed.
async fn stream_topic<R: AsyncRead + Unpin>(
    topic: String,
    mut reader: R,
    mut writer: OwnedWriteHalf,
    ctx: &HubCtx,
) -> Result<(), ConnectionError> {
    let subscriber = SubscriberId::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    ctx.channels.subscribe(topic.clone(), subscriber.clone(), tx);

    let result = async {
        write_frame_timeout(&mut writer, &Response::Ready, ctx.ipc_timeout).await?;
        loop {
            tokio::select! {
                message = rx.recv() => match message {
                    Some(message) => {
                        let response = Response::Topic { topic: message.topic, payload: message.payload };
                        write_frame(&mut writer, &response).await?;
                    }
                    None => break,
                },
                _ = detect_client_disconnect(&mut reader) => break,
            }
        }
        Ok::<(), ConnectionError>(())
    }
    .await;

    ctx.channels.unsubscribe(&subscriber);
    debug!(topic = %topic, %subscriber, "topic subscriber left");
    result
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
