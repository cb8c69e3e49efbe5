// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn target_key_uses_requester_workspace_project_profile() {
    let job = JobBuilder::default().requester("bob").project("shop").profile_name("qa").build();
    let key = job.target_key().unwrap();
    assert_eq!(key.to_string(), "bob/ws/shop/qa");
    assert_eq!(key.relative_path(), Path::new("bob/ws/shop/qa"));
}

#[test]
fn target_key_ignores_job_kind_and_build_kind() {
    let a = JobBuilder::default().kind(JobKind::Build).build();
    let b = JobBuilder::default().kind(JobKind::Clean).release().build();
    assert_eq!(a.target_key().unwrap(), b.target_key().unwrap());
    assert_ne!(a.id, b.id);
}

#[test]
fn target_key_rejects_unsafe_requester() {
    let job = JobBuilder::default().requester("../root").build();
    assert!(matches!(
        job.target_key(),
        Err(ProfileError::UnsafeSegment { field: "requester", .. })
    ));
}

#[test]
fn requester_debug_hides_credential() {
    let r = Requester::new("carol").with_credential("token-123");
    let rendered = format!("{r:?}");
    assert!(rendered.contains("carol"));
    assert!(!rendered.contains("token-123"));
}

#[test]
fn job_kind_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&JobKind::Rebuild).unwrap(), "\"rebuild\"");
    assert_eq!(JobKind::Clean.to_string(), "clean");
}

#[test]
fn job_document_roundtrips_without_platform_info() {
    let job = JobBuilder::default().build();
    let mut value = serde_json::to_value(&job).unwrap();
    value.as_object_mut().unwrap().remove("platform_info");
    let back: Job = serde_json::from_value(value).unwrap();
    assert_eq!(back.platform_info, serde_json::Value::Null);
    assert_eq!(back.id, job.id);
}
