// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub command handlers: workers and ping

use anyhow::Result;

use crate::client::HubClient;
use crate::color;
use crate::output::{format_workers, OutputFormat};

pub async fn workers(client: &HubClient, format: OutputFormat) -> Result<()> {
    let workers = client.workers().await?;
    match format {
        OutputFormat::Text => print!("{}", format_workers(&workers)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&workers)?),
    }
    Ok(())
}

pub async fn ping(client: &HubClient) -> Result<()> {
    let rtt = client.ping().await?;
    println!("pong from {} {}", client.addr(), color::muted(&format!("({} ms)", rtt.as_millis())));
    Ok(())
}
