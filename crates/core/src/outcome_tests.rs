// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    success  = { StatusCode::Success,  0 },
    progress = { StatusCode::Progress, 1 },
    failure  = { StatusCode::Failure,  2 },
)]
fn status_code_serializes_as_integer(code: StatusCode, raw: u8) {
    assert_eq!(serde_json::to_string(&code).unwrap(), raw.to_string());
    let back: StatusCode = serde_json::from_str(&raw.to_string()).unwrap();
    assert_eq!(back, code);
}

#[test]
fn unknown_status_code_is_rejected() {
    assert!(serde_json::from_str::<StatusCode>("7").is_err());
}

#[test]
fn only_progress_is_non_terminal() {
    assert!(StatusCode::Success.is_terminal());
    assert!(StatusCode::Failure.is_terminal());
    assert!(!StatusCode::Progress.is_terminal());
}

#[test]
fn outcome_status_codes() {
    assert_eq!(JobOutcome::Succeeded { artifact: None }.status_code(), StatusCode::Success);
    assert_eq!(JobOutcome::already_running().status_code(), StatusCode::Failure);
    let failed =
        JobOutcome::Failed { stage: Stage::Build, kind: FailureKind::Tool, reason: "boom".into() };
    assert_eq!(failed.status_code(), StatusCode::Failure);
    assert_eq!(failed.reason(), Some("boom"));
}

#[test]
fn already_running_reason() {
    assert_eq!(JobOutcome::already_running().reason(), Some(ALREADY_RUNNING));
}

#[test]
fn outcome_is_tagged() {
    let json = serde_json::to_value(JobOutcome::Failed {
        stage: Stage::Signing,
        kind: FailureKind::Input,
        reason: "invalid keystore filename".into(),
    })
    .unwrap();
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["stage"], "signing");
    assert_eq!(json["kind"], "input");
}

#[test]
fn only_tool_failures_are_retryable() {
    assert!(FailureKind::Tool.is_retryable());
    assert!(!FailureKind::Input.is_retryable());
    assert!(!FailureKind::Cancelled.is_retryable());
}

#[test]
fn display_mentions_stage() {
    let failed =
        JobOutcome::Failed { stage: Stage::Build, kind: FailureKind::Tool, reason: "exit 1".into() };
    assert_eq!(failed.to_string(), "failed at build: exit 1");
}
