// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! swd: build farm daemon.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sw_daemon::{logging, run_hub, run_worker, Config};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "swd", version, about = "Build farm daemon")]
struct Cli {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Clone, Copy)]
enum Role {
    /// Execute jobs sent by a hub
    Worker,
    /// Dispatch jobs to workers and serve clients
    Hub,
}

impl Role {
    fn name(self) -> &'static str {
        match self {
            Role::Worker => "swd-worker",
            Role::Hub => "swd-hub",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("swd: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = match logging::init(&config.log, cli.role.name()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("swd: {e}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                signal.cancel();
            }
            Err(e) => error!("cannot listen for ctrl-c: {e}"),
        }
    });

    let result = match cli.role {
        Role::Worker => run_worker(&config, shutdown).await,
        Role::Hub => run_hub(&config, shutdown).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
