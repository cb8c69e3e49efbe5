// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub role: worker pool, dispatcher, progress bridge, and the client listener.

mod dispatcher;
mod link;
mod listener;
mod pool;
mod selection;

pub use dispatcher::{DispatchError, Dispatcher, Submission};
pub use link::ResultHandler;
pub use listener::{HubCtx, HubListener};
pub use pool::{PoolOptions, WorkerPool};
pub use selection::SelectionPolicy;
