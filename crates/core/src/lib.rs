// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sw-core: Shared data model for the shipwright build farm

pub mod macros;

pub mod event;
pub mod id;
pub mod job;
pub mod outcome;
pub mod profile;
pub mod stage;

#[cfg(any(test, feature = "test-support"))]
pub use event::RecordingSink;
pub use event::{EventKind, ProgressEvent, ProgressSink};
pub use id::{short, JobId, SubscriberId};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobKind, Requester, TargetKey};
pub use outcome::{FailureKind, JobOutcome, StatusCode, ALREADY_RUNNING};
pub use profile::{
    BuildKind, BuildProfile, KeystoreInfo, Platform, ProfileError, SigningDescriptor,
};
pub use stage::{Stage, StagePlan};
