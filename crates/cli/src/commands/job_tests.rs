// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;
use sw_core::{FailureKind, Stage, ALREADY_RUNNING};
use yare::parameterized;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    args: SubmitArgs,
}

fn parse(extra: &[&str]) -> Result<SubmitArgs, clap::Error> {
    let base = ["sw", "--workspace", "ws", "--project", "app", "--requester", "alice"];
    TestCli::try_parse_from(base.iter().chain(extra)).map(|cli| cli.args)
}

#[parameterized(
    build = { &[], JobKind::Build },
    rebuild = { &["--rebuild"], JobKind::Rebuild },
    clean = { &["--clean"], JobKind::Clean },
)]
fn kind_from_flags(flags: &[&str], expected: JobKind) {
    assert_eq!(parse(flags).unwrap().kind(), expected);
}

#[test]
fn rebuild_and_clean_conflict() {
    assert!(parse(&["--rebuild", "--clean"]).is_err());
}

#[test]
fn defaults_to_debug_android_default_profile() {
    let profile = parse(&[]).unwrap().profile();

    assert_eq!(profile.name, "default");
    assert_eq!(profile.platform, Platform::Android);
    assert_eq!(profile.build, BuildKind::Debug);
    assert!(profile.plugins.is_empty());
    assert!(profile.signing.is_none());
}

#[test]
fn plugins_accept_repeats_and_commas() {
    let args = parse(&["--plugin", "camera,file", "--plugin", "geo"]).unwrap();
    assert_eq!(args.profile().plugins, vec!["camera", "file", "geo"]);
}

#[test]
fn signing_fields_build_a_keystore_record() {
    let args = parse(&[
        "--release",
        "--sign",
        "upload",
        "--keystore",
        "app.jks",
        "--store-password",
        "secret",
    ])
    .unwrap();

    let profile = args.profile();
    assert!(profile.is_signed_release());
    let signing = profile.signing.unwrap();
    assert_eq!(signing.alias, "upload");
    let keystore = signing.keystore.unwrap();
    assert_eq!(keystore.filename(), Some("app.jks"));
    assert_eq!(keystore.remote_path().as_deref(), Some("keystores/app.jks"));
    assert_eq!(keystore.store_password, "secret");
}

#[test]
fn sign_requires_release() {
    assert!(parse(&["--sign", "upload"]).is_err());
}

#[test]
fn platform_info_must_be_json() {
    assert!(parse(&["--platform-info", "{not json"]).is_err());
    let args = parse(&["--platform-info", r#"{"sdk": 33}"#]).unwrap();
    assert_eq!(args.platform_info, Some(serde_json::json!({"sdk": 33})));
}

#[test]
fn credential_is_attached_to_requester() {
    let args = parse(&["--credential", "tok"]).unwrap();
    assert_eq!(args.requester(), Requester::new("alice").with_credential("tok"));
}

#[test]
fn failed_terminal_event_exits_with_job_failed() {
    let id = JobId::from_string("job-1");
    let failure = ProgressEvent::failure(&id, Stage::Build, FailureKind::Tool, "boom");

    let err = check_terminal(&failure).unwrap_err();

    assert_eq!(err.downcast_ref::<ExitError>().map(|e| e.code), Some(JOB_FAILED));
    assert!(check_terminal(&ProgressEvent::success(&id, None)).is_ok());
}

#[test]
fn aborted_terminal_event_exits_with_job_failed() {
    let id = JobId::from_string("job-1");
    let aborted = ProgressEvent::aborted(&id, ALREADY_RUNNING);

    let err = check_terminal(&aborted).unwrap_err();

    assert_eq!(err.downcast_ref::<ExitError>().map(|e| e.code), Some(JOB_FAILED));
}
