// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn progress_event_carries_stage() {
    let id = JobId::from_string("job-1");
    let event = ProgressEvent::progress(&id, Stage::Build);
    assert_eq!(event.kind, EventKind::Progress);
    assert_eq!(event.stage, Some(Stage::Build));
    assert!(!event.is_terminal());
}

#[test]
fn success_event_names_artifact() {
    let id = JobId::from_string("job-1");
    let event = ProgressEvent::success(&id, Some("app-default-debug.apk"));
    assert!(event.is_terminal());
    assert_eq!(event.stage, None);
    assert_eq!(event.payload["artifact"], "app-default-debug.apk");
}

#[test]
fn aborted_outcome_maps_to_terminal_aborted_event() {
    let id = JobId::from_string("job-1");
    let event = ProgressEvent::from_outcome(&id, &JobOutcome::already_running());
    assert_eq!(event.kind, EventKind::Aborted);
    assert_eq!(event.stage, None);
    assert_eq!(event.payload["reason"], crate::ALREADY_RUNNING);
    assert!(event.is_terminal());
    assert!(event.is_unsuccessful());
}

#[test]
fn failed_outcome_maps_to_failure_event() {
    let id = JobId::from_string("job-1");
    let outcome = JobOutcome::Failed {
        stage: Stage::PlatformAdd,
        kind: FailureKind::Tool,
        reason: "cordova exited with 1".into(),
    };
    let event = ProgressEvent::from_outcome(&id, &outcome);
    assert_eq!(event.kind, EventKind::Failure);
    assert!(event.is_unsuccessful());
    assert_eq!(event.stage, Some(Stage::PlatformAdd));
    assert_eq!(event.payload["reason"], "cordova exited with 1");
    assert_eq!(event.payload["kind"], "tool");
}

#[test]
fn recording_sink_through_arc() {
    let sink = std::sync::Arc::new(RecordingSink::new());
    let id = JobId::from_string("job-1");
    let dyn_sink: &dyn ProgressSink = &sink;
    dyn_sink.publish(ProgressEvent::progress(&id, Stage::Init));
    dyn_sink.publish(ProgressEvent::success(&id, None));
    assert_eq!(sink.stages(), vec![Stage::Init]);
    assert_eq!(sink.events().len(), 2);
}
