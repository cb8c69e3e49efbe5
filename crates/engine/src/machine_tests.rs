// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

/// Drive a machine with all-success results, collecting entered stages.
fn walk(plan: StagePlan) -> Vec<Stage> {
    let mut machine = StageMachine::new(plan);
    let mut entered = Vec::new();
    let mut action = machine.advance(Ok(()));
    while let NextAction::Enter(stage) = action {
        entered.push(stage);
        action = machine.advance(Ok(()));
    }
    assert_eq!(action, NextAction::Complete);
    entered
}

#[parameterized(
    plain = { StagePlan { plugins: false, signing: false }, &[Stage::Init, Stage::DownloadSource, Stage::PlatformAdd, Stage::Build, Stage::UploadPackage] },
    plugins = { StagePlan { plugins: true, signing: false }, &[Stage::Init, Stage::DownloadSource, Stage::PlatformAdd, Stage::PluginReconcile, Stage::Build, Stage::UploadPackage] },
    signed = { StagePlan { plugins: false, signing: true }, &[Stage::Init, Stage::DownloadSource, Stage::PlatformAdd, Stage::Build, Stage::Signing, Stage::UploadPackage] },
    everything = { StagePlan { plugins: true, signing: true }, &[Stage::Init, Stage::DownloadSource, Stage::PlatformAdd, Stage::PluginReconcile, Stage::Build, Stage::Signing, Stage::UploadPackage] },
)]
fn success_walks_plan_in_order(plan: StagePlan, expected: &[Stage]) {
    assert_eq!(walk(plan), expected);
}

#[test]
fn failure_stops_at_current_stage() {
    let mut machine = StageMachine::new(StagePlan::default());
    assert_eq!(machine.advance(Ok(())), NextAction::Enter(Stage::Init));
    assert_eq!(machine.advance(Ok(())), NextAction::Enter(Stage::DownloadSource));
    assert_eq!(machine.current(), Some(Stage::DownloadSource));

    let error = StageError::Tool("unzip failed".into());
    assert_eq!(
        machine.advance(Err(error.clone())),
        NextAction::Fail { stage: Stage::DownloadSource, error }
    );
    assert!(machine.is_done());
    assert_eq!(machine.current(), None);
}

#[test]
fn finished_machine_ignores_further_results() {
    let mut machine = StageMachine::new(StagePlan::default());
    machine.advance(Ok(()));
    machine.advance(Err(StageError::Input("bad".into())));
    assert_eq!(machine.advance(Ok(())), NextAction::Complete);
}

#[test]
fn first_result_is_ignored() {
    let mut machine = StageMachine::new(StagePlan::default());
    let action = machine.advance(Err(StageError::Tool("ignored".into())));
    assert_eq!(action, NextAction::Enter(Stage::Init));
}
