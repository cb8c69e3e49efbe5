// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loopback helpers shared by the daemon's tests.

use std::time::Duration;

use sw_adapters::{FakeArtifactStore, FakeToolchain};
use sw_engine::{Runner, WorkLayout};
use sw_wire::{read_frame_timeout, write_frame, Request, Response};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::hub::{PoolOptions, SelectionPolicy};
use crate::worker::WorkerServer;

pub(crate) const STEP: Duration = Duration::from_secs(5);

/// A worker server on an ephemeral port backed by fakes.
pub(crate) struct TestWorker {
    pub addr: String,
    pub tools: FakeToolchain,
    pub store: FakeArtifactStore,
    pub shutdown: CancellationToken,
    _dir: tempfile::TempDir,
}

pub(crate) async fn spawn_worker() -> TestWorker {
    let dir = tempfile::tempdir().unwrap();
    let tools = FakeToolchain::new();
    let store = FakeArtifactStore::new();
    let runner = Runner::new(tools.clone(), store.clone(), WorkLayout::new(dir.path()));
    let server = WorkerServer::bind("127.0.0.1:0", runner, STEP).await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    let shutdown = CancellationToken::new();
    tokio::spawn(server.run(shutdown.clone()));
    TestWorker { addr, tools, store, shutdown, _dir: dir }
}

pub(crate) fn fast_options(policy: SelectionPolicy) -> PoolOptions {
    PoolOptions { policy, reconnect_delay: Duration::from_millis(50), ipc_timeout: STEP }
}

/// Poll `cond` until it holds, failing the test after a few seconds.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(STEP, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Open a client connection, send `request`, and read the first response.
pub(crate) async fn send(
    addr: &str,
    request: &Request,
) -> (OwnedReadHalf, OwnedWriteHalf, Response) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    write_frame(&mut writer, request).await.unwrap();
    let response = read_frame_timeout(&mut reader, STEP).await.unwrap();
    (reader, writer, response)
}

pub(crate) async fn next(reader: &mut OwnedReadHalf) -> Response {
    read_frame_timeout(reader, STEP).await.unwrap()
}
