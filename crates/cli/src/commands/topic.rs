// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-topic commands: watch and announce

use anyhow::Result;

use crate::client::HubClient;
use crate::color;
use crate::output::OutputFormat;

pub async fn watch(topic: &str, client: &HubClient, format: OutputFormat) -> Result<()> {
    client
        .watch(topic, |topic, payload| match format {
            OutputFormat::Text => println!("{}  {}", color::header(topic), payload),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "topic": topic, "payload": payload }))
            }
        })
        .await?;
    Ok(())
}

pub async fn announce(
    scope: &str,
    path: &str,
    payload: serde_json::Value,
    client: &HubClient,
    format: OutputFormat,
) -> Result<()> {
    let delivered = client.announce(scope, path, payload).await?;
    match format {
        OutputFormat::Text => println!("Delivered to {delivered} subscriber(s)"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "delivered": delivered })),
    }
    Ok(())
}
