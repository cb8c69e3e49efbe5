// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with an optional timeout.

use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

/// Failure to run a subprocess to completion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubprocessError {
    #[error("{description} failed to start: {message}")]
    Spawn { description: String, message: String },

    #[error("{description} timed out after {after:?}")]
    TimedOut { description: String, after: Duration },
}

/// Run `cmd` and collect its output.
///
/// With a timeout, the child is killed when the deadline passes. A
/// non-zero exit status is not an error here; callers inspect `Output`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Option<Duration>,
    description: &str,
) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    let fut = cmd.output();
    let result = match timeout {
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(description, timeout_secs = after.as_secs(), "subprocess timed out");
                return Err(SubprocessError::TimedOut { description: description.to_string(), after });
            }
        },
        None => fut.await,
    };
    result.map_err(|e| SubprocessError::Spawn {
        description: description.to_string(),
        message: e.to_string(),
    })
}

/// Human-readable diagnostics from a finished command: stderr if present,
/// otherwise stdout, otherwise the exit status.
pub fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    format!("exited with {}", output.status)
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
