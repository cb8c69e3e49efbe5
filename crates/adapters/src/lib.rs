// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the external collaborators a build job touches.

pub mod store;
pub mod subprocess;
pub mod toolchain;

pub use store::{ArtifactStore, LocalArtifactStore, StoreError};
pub use toolchain::{parse_plugin_list, ShellToolchain, ToolError, Toolchain, ToolchainConfig};

#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeArtifactStore, StoreCall};
#[cfg(any(test, feature = "test-support"))]
pub use toolchain::{FakeToolchain, ToolCall};
