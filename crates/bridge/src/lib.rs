// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Progress notification bridge.
//!
//! - [`ProgressBridge`] buffers each job's events from registration on and
//!   replays them to subscribers that attach late.
//! - [`ChannelHub`] is plain topic fan-out with no buffering, used for
//!   hierarchical change notifications (see [`change_topics`]).

mod channel;
mod progress;
mod topic;

pub use channel::{ChannelHub, TopicMessage, TopicSender};
pub use progress::{BridgeError, EventSender, ProgressBridge};
pub use topic::{change_topics, topic_name};
