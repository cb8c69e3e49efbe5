// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC channel protocol shared by the hub, workers, and the CLI.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;
mod worker;

pub use request::Request;
pub use response::{Response, WorkerEntry};
pub use wire::{
    decode, encode, read_frame, read_frame_timeout, read_message, write_frame,
    write_frame_timeout, write_message, ProtocolError, MAX_FRAME_LEN,
};
pub use worker::{WorkerReply, WorkerRequest};

/// Protocol version exchanged in `Hello` handshakes.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");
