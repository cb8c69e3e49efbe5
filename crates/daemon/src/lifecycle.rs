// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup and shutdown for both daemon roles.

use std::path::PathBuf;
use std::sync::Arc;

use sw_adapters::{LocalArtifactStore, ShellToolchain};
use sw_bridge::{ChannelHub, ProgressBridge};
use sw_core::ProgressSink;
use sw_engine::{Runner, WorkLayout};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::hub::{Dispatcher, HubCtx, HubListener, PoolOptions, WorkerPool};
use crate::worker::WorkerServer;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to read config {0}: {1}")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("failed to bind {0}: {1}")]
    BindFailed(String, #[source] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve jobs with the shell toolchain and the local artifact store until
/// `shutdown` fires.
pub async fn run_worker(config: &Config, shutdown: CancellationToken) -> Result<(), LifecycleError> {
    tokio::fs::create_dir_all(&config.worker.work_root).await?;
    let tools = ShellToolchain::new(config.toolchain());
    let store = LocalArtifactStore::new(&config.worker.store_root);
    let runner = Runner::new(tools, store, WorkLayout::new(&config.worker.work_root))
        .with_cancel(shutdown.child_token());

    let server = WorkerServer::bind(&config.worker.listen, runner, config.ipc_timeout()).await?;
    info!(
        work_root = %config.worker.work_root.display(),
        store_root = %config.worker.store_root.display(),
        "worker ready"
    );
    server.run(shutdown).await;
    Ok(())
}

/// Assemble the hub's parts without binding anything.
pub fn build_hub(config: &Config) -> (Arc<WorkerPool>, HubCtx) {
    let bridge = Arc::new(ProgressBridge::new());
    let sink: Arc<dyn ProgressSink> = Arc::clone(&bridge) as Arc<dyn ProgressSink>;
    let options = PoolOptions {
        policy: config.hub.selection,
        reconnect_delay: config.reconnect_delay(),
        ipc_timeout: config.ipc_timeout(),
    };
    let pool = Arc::new(WorkerPool::new(sink, options));
    let ctx = HubCtx {
        dispatcher: Dispatcher::new(Arc::clone(&pool), bridge),
        channels: Arc::new(ChannelHub::new()),
        ipc_timeout: config.ipc_timeout(),
    };
    (pool, ctx)
}

/// Connect to the configured workers and serve clients until `shutdown`.
pub async fn run_hub(config: &Config, shutdown: CancellationToken) -> Result<(), LifecycleError> {
    if config.hub.workers.is_empty() {
        return Err(LifecycleError::Config("hub needs at least one worker address".to_string()));
    }
    let (pool, ctx) = build_hub(config);
    for address in &config.hub.workers {
        pool.connect(address.clone());
    }

    let listener = HubListener::bind(&config.hub.listen, Arc::new(ctx)).await?;
    info!(workers = config.hub.workers.len(), policy = ?config.hub.selection, "hub ready");
    listener.run(shutdown).await;

    pool.shutdown().await;
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
