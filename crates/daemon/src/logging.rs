// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LogConfig;
use crate::lifecycle::LifecycleError;

/// Keeps the file writer flushing. Drop it last.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber: stderr always, plus a daily-rolling
/// `<dir>/<file_prefix>.<date>` file when `config.dir` is set.
pub fn init(config: &LogConfig, file_prefix: &str) -> Result<LoggingGuard, LifecycleError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| LifecycleError::Logging(format!("bad filter {:?}: {e}", config.filter)))?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LifecycleError::Logging(e.to_string()))?;

    Ok(LoggingGuard { _file_guard: guard })
}
