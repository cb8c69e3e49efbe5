// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker role: accepts dispatcher links and runs their jobs.

mod connection;

use std::net::SocketAddr;
use std::time::Duration;

use sw_adapters::{ArtifactStore, Toolchain};
use sw_engine::Runner;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::connection::log_connection_error;
use crate::lifecycle::LifecycleError;

/// RPC server executing jobs on behalf of one or more dispatchers.
pub struct WorkerServer<T, S> {
    listener: TcpListener,
    runner: Runner<T, S>,
    ipc_timeout: Duration,
}

impl<T: Toolchain, S: ArtifactStore> WorkerServer<T, S> {
    pub async fn bind(
        addr: &str,
        runner: Runner<T, S>,
        ipc_timeout: Duration,
    ) -> Result<Self, LifecycleError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| LifecycleError::BindFailed(addr.to_string(), e))?;
        Ok(Self { listener, runner, ipc_timeout })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept dispatcher links until `shutdown` fires, then cancel
    /// in-flight jobs at their next stage boundary.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(addr = ?self.listener.local_addr().ok(), "worker listening");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.listener.accept() => match result {
                    Ok((stream, peer)) => {
                        debug!(%peer, "dispatcher connected");
                        let runner = self.runner.clone();
                        let ipc_timeout = self.ipc_timeout;
                        tokio::spawn(async move {
                            if let Err(e) = connection::serve(stream, runner, ipc_timeout).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("accept error: {}", e),
                },
            }
        }
        self.runner.cancel_token().cancel();
        info!("worker stopped accepting");
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
