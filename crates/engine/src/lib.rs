// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sw-engine: the worker-side build pipeline.
//!
//! A [`Runner`] executes one job end to end. It takes the target's entry
//! in the [`LockTable`], drives the stages through a [`StageMachine`],
//! and reports each stage to a [`sw_core::ProgressSink`].

mod artifact;
mod error;
mod layout;
mod lock;
mod machine;
mod plugins;
mod runner;
mod signing;

pub use artifact::{artifact_filename, find_artifact, locate_artifact};
pub use error::StageError;
pub use layout::WorkLayout;
pub use lock::{LockTable, TargetLock};
pub use machine::{NextAction, StageMachine};
pub use plugins::{PluginPlan, PROTECTED_PLUGINS};
pub use runner::Runner;
pub use signing::INVALID_KEYSTORE;
