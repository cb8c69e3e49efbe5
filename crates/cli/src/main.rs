// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sw: command-line client for the build farm hub.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sw_core::JobId;

use crate::client::HubClient;
use crate::commands::job::SubmitArgs;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "sw",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SW_BUILD_HASH"), ")"),
    about = "Submit and follow mobile app builds",
    styles = color::styles()
)]
struct Cli {
    /// Hub address
    #[arg(long, global = true, env = "SW_HUB_ADDR", default_value = "127.0.0.1:7300")]
    hub: String,

    /// Connect and request timeout in milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    timeout_ms: u64,

    #[arg(long, short = 'o', global = true, value_enum, default_value_t)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a build, rebuild, or clean job
    Submit(Box<SubmitArgs>),
    /// Replay a job's progress and follow it to completion
    Status {
        job_id: String,
    },
    /// Follow a change topic, e.g. `repo:/src/*`
    Watch {
        topic: String,
    },
    /// Announce a change at a path to its exact and ancestor topics
    Announce {
        #[arg(long)]
        scope: String,
        #[arg(long)]
        path: String,
        /// JSON payload
        #[arg(long, default_value = "null")]
        payload: String,
    },
    /// List worker pool slots
    Workers,
    /// Check that the hub is reachable
    Ping,
}

async fn run(cli: Cli) -> Result<()> {
    let client = HubClient::new(cli.hub, Duration::from_millis(cli.timeout_ms));
    let format = cli.output;
    match cli.command {
        Command::Submit(args) => commands::job::submit(*args, &client, format).await,
        Command::Status { job_id } => {
            commands::job::status(&JobId::from_string(job_id), &client, format).await
        }
        Command::Watch { topic } => commands::topic::watch(&topic, &client, format).await,
        Command::Announce { scope, path, payload } => {
            let payload: serde_json::Value = serde_json::from_str(&payload)
                .map_err(|e| anyhow::anyhow!("--payload is not valid JSON: {e}"))?;
            commands::topic::announce(&scope, &path, payload, &client, format).await
        }
        Command::Workers => commands::hub::workers(&client, format).await,
        Command::Ping => commands::hub::ping(&client).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}
