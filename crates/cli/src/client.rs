// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub client over the length-prefixed JSON channel.

use std::time::{Duration, Instant};

use sw_core::{BuildProfile, JobId, JobKind, ProgressEvent, Requester};
use sw_wire::{
    read_frame, read_frame_timeout, write_frame_timeout, ProtocolError, Request, Response,
    WorkerEntry,
};
use thiserror::Error;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot reach hub at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out talking to hub at {0}")]
    Timeout(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The hub answered with `Error`
    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

pub struct HubClient {
    addr: String,
    timeout: Duration,
}

impl HubClient {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self { addr: addr.into(), timeout }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send `request` and return the first response with both halves.
    ///
    /// Streaming requests keep reading from the read half and must hold
    /// the write half: the hub treats EOF as an unsubscribe.
    async fn open(
        &self,
        request: &Request,
    ) -> Result<(OwnedReadHalf, OwnedWriteHalf, Response), ClientError> {
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| ClientError::Timeout(self.addr.clone()))?
            .map_err(|source| ClientError::Connect { addr: self.addr.clone(), source })?;
        let (mut reader, mut writer) = stream.into_split();
        write_frame_timeout(&mut writer, request, self.timeout).await?;
        let response = read_frame_timeout(&mut reader, self.timeout).await?;
        Ok((reader, writer, response))
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let (_, _, response) = self.open(request).await?;
        Ok(response)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Err(ClientError::Unexpected(format!("{other:?}"))),
        }
    }

    /// Round-trip time of a `Ping`.
    pub async fn ping(&self) -> Result<Duration, ClientError> {
        let started = Instant::now();
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(started.elapsed()),
            other => Self::reject(other),
        }
    }

    pub async fn submit(
        &self,
        kind: JobKind,
        profile: BuildProfile,
        platform_info: serde_json::Value,
        requester: Requester,
    ) -> Result<JobId, ClientError> {
        let request = Request::Submit { kind, profile, platform_info, requester };
        match self.send(&request).await? {
            Response::Submitted { job_id } => Ok(job_id),
            other => Self::reject(other),
        }
    }

    /// Replay and follow a job, calling `on_event` for each event, until
    /// its terminal event arrives.
    pub async fn follow(
        &self,
        job_id: &JobId,
        mut on_event: impl FnMut(&ProgressEvent),
    ) -> Result<ProgressEvent, ClientError> {
        let (mut reader, _writer, response) =
            self.open(&Request::GetStatus { job_id: job_id.clone() }).await?;
        if response != Response::Ready {
            return Self::reject(response);
        }
        loop {
            match read_frame(&mut reader).await? {
                Response::Event { event } => {
                    on_event(&event);
                    if event.is_terminal() {
                        return Ok(event);
                    }
                }
                other => return Self::reject(other),
            }
        }
    }

    /// Follow a topic until the hub closes the connection.
    pub async fn watch(
        &self,
        topic: &str,
        mut on_message: impl FnMut(&str, &serde_json::Value),
    ) -> Result<(), ClientError> {
        let (mut reader, _writer, response) =
            self.open(&Request::Watch { topic: topic.to_string() }).await?;
        if response != Response::Ready {
            return Self::reject(response);
        }
        loop {
            match read_frame(&mut reader).await {
                Ok(Response::Topic { topic, payload }) => on_message(&topic, &payload),
                Ok(other) => return Self::reject(other),
                Err(ProtocolError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn announce(
        &self,
        scope: &str,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<usize, ClientError> {
        let request =
            Request::Announce { scope: scope.to_string(), path: path.to_string(), payload };
        match self.send(&request).await? {
            Response::Announced { delivered } => Ok(delivered),
            other => Self::reject(other),
        }
    }

    pub async fn workers(&self) -> Result<Vec<WorkerEntry>, ClientError> {
        match self.send(&Request::Workers).await? {
            Response::Workers { workers } => Ok(workers),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
