// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sw_core::JobBuilder;
use yare::parameterized;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"x").unwrap();
}

#[parameterized(
    android_debug = { Platform::Android, BuildKind::Debug, "platforms/android/app/build/outputs/apk/debug/app-debug.apk" },
    android_release = { Platform::Android, BuildKind::Release, "platforms/android/app/build/outputs/apk/release/app-release-unsigned.apk" },
    ios = { Platform::Ios, BuildKind::Release, "platforms/ios/build/device/MyApp.ipa" },
)]
fn finds_platform_artifact(platform: Platform, kind: BuildKind, rel: &str) {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), rel);
    assert_eq!(locate_artifact(dir.path(), &platform, kind).unwrap(), dir.path().join(rel));
}

#[test]
fn android_release_falls_back_to_signed_name() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "platforms/android/build/outputs/apk/android-release.apk");
    let found = locate_artifact(dir.path(), &Platform::Android, BuildKind::Release).unwrap();
    assert!(found.ends_with("android-release.apk"));
}

#[test]
fn unsigned_release_preferred_over_signed() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "platforms/android/out/a-release.apk");
    touch(dir.path(), "platforms/android/out/b-release-unsigned.apk");
    let found = locate_artifact(dir.path(), &Platform::Android, BuildKind::Release).unwrap();
    assert!(found.ends_with("b-release-unsigned.apk"));
}

#[test]
fn debug_build_ignores_release_output() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "platforms/android/out/app-release.apk");
    let err = locate_artifact(dir.path(), &Platform::Android, BuildKind::Debug).unwrap_err();
    assert!(matches!(err, StageError::ArtifactMissing { .. }));
}

#[test]
fn browser_artifact_is_www_directory() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "platforms/browser/www/index.html");
    let found = locate_artifact(dir.path(), &Platform::Browser, BuildKind::Debug).unwrap();
    assert_eq!(found, dir.path().join("platforms/browser/www"));
}

#[test]
fn unknown_platform_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = locate_artifact(dir.path(), &Platform::from("windows"), BuildKind::Debug).unwrap_err();
    assert_eq!(err, StageError::Input("no artifact pattern for platform windows".into()));
}

#[tokio::test]
async fn find_artifact_searches_off_the_runtime() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "platforms/android/app/app-debug.apk");

    let found =
        find_artifact(dir.path().to_path_buf(), Platform::Android, BuildKind::Debug).await.unwrap();
    assert!(found.ends_with("app-debug.apk"));

    let err = find_artifact(dir.path().to_path_buf(), Platform::Ios, BuildKind::Debug).await;
    assert!(matches!(err, Err(StageError::ArtifactMissing { .. })));
}

#[test]
fn project_path_with_glob_characters_is_escaped() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("weird[1]");
    touch(&project, "platforms/ios/build/x.ipa");
    assert!(locate_artifact(&project, &Platform::Ios, BuildKind::Debug).is_ok());
}

#[parameterized(
    apk = { "/w/app-release-unsigned.apk", "app-default-debug.apk" },
    ipa = { "/w/build/MyApp.ipa", "app-default-debug.ipa" },
    www = { "/w/platforms/browser/www", "app-default-debug.www" },
)]
fn uploaded_filename(artifact: &str, expected: &str) {
    let job = JobBuilder::default().build();
    assert_eq!(artifact_filename(&job.profile, Path::new(artifact)), expected);
}
