// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use sw_core::{EventKind, ProgressEvent};
use sw_wire::WorkerEntry;

use crate::color;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One line describing a progress event.
pub fn format_event(event: &ProgressEvent) -> String {
    let stage = event.stage.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
    match event.kind {
        EventKind::Progress => format!("{}  {}", event.job_id, color::stage(&stage)),
        EventKind::Success => match event.payload["artifact"].as_str() {
            Some(artifact) => {
                format!("{}  {} {}", event.job_id, color::success("succeeded"), artifact)
            }
            None => format!("{}  {}", event.job_id, color::success("succeeded")),
        },
        EventKind::Failure => {
            let kind = event.payload["kind"].as_str().unwrap_or("unknown");
            let reason = event.payload["reason"].as_str().unwrap_or("");
            format!(
                "{}  {} at {} ({}): {}",
                event.job_id,
                color::failure("failed"),
                stage,
                kind,
                reason
            )
        }
        EventKind::Aborted => {
            let reason = event.payload["reason"].as_str().unwrap_or("");
            format!("{}  {}: {}", event.job_id, color::failure("aborted"), reason)
        }
    }
}

pub fn print_event(event: &ProgressEvent, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", format_event(event)),
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("cannot encode event: {e}"),
        },
    }
}

/// Render the worker pool as an aligned table.
pub fn format_workers(workers: &[WorkerEntry]) -> String {
    if workers.is_empty() {
        return "No workers configured\n".to_string();
    }
    let width = workers.iter().map(|w| w.address.len()).max().unwrap_or(0).max("ADDRESS".len());
    let mut out = format!("{:<width$}  {:<12}  {}\n", "ADDRESS", "STATE", "OUTSTANDING");
    for w in workers {
        let state = color::worker_state(w.connected, 12);
        out.push_str(&format!("{:<width$}  {}  {}\n", w.address, state, w.outstanding));
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
