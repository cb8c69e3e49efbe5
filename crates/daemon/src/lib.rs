// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sw-daemon: the `swd` worker and hub roles.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
mod connection;
pub mod env;
pub mod hub;
pub mod lifecycle;
pub mod logging;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use connection::ConnectionError;
pub use hub::{DispatchError, Dispatcher, SelectionPolicy, WorkerPool};
pub use lifecycle::{run_hub, run_worker, LifecycleError};
pub use worker::WorkerServer;
