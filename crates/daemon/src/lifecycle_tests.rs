// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::STEP;
use tokio::net::TcpListener;

#[tokio::test]
async fn hub_requires_workers() {
    let config = Config::default();

    let err = run_hub(&config, CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, LifecycleError::Config(_)));
}

#[tokio::test]
async fn worker_bind_conflict_is_reported() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.worker.listen = taken.local_addr().unwrap().to_string();
    config.worker.work_root = dir.path().join("work");

    let err = run_worker(&config, CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, LifecycleError::BindFailed(..)));
}

#[tokio::test]
async fn worker_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.worker.listen = "127.0.0.1:0".to_string();
    config.worker.work_root = dir.path().join("work");
    config.worker.store_root = dir.path().join("store");
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let result = tokio::time::timeout(STEP, run_worker(&config, shutdown)).await.unwrap();

    assert!(result.is_ok());
    assert!(dir.path().join("work").is_dir());
}

#[tokio::test]
async fn hub_stops_on_shutdown() {
    let mut config = Config::default();
    config.hub.listen = "127.0.0.1:0".to_string();
    config.hub.workers = vec!["127.0.0.1:1".to_string()];
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let result = tokio::time::timeout(STEP, run_hub(&config, shutdown)).await.unwrap();

    assert!(result.is_ok());
}

#[test]
fn build_hub_wires_pool_into_dispatcher() {
    let (pool, ctx) = build_hub(&Config::default());

    assert!(Arc::ptr_eq(&pool, ctx.dispatcher.pool()));
    assert!(pool.workers().is_empty());
}
