// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn alice() -> Requester {
    Requester::new("alice").with_credential("token")
}

#[parameterized(
    plain = { "keystores/app.jks", true },
    dotted = { "./keystores/app.jks", true },
    parent = { "../bob/app.jks", false },
    absolute = { "/etc/passwd", false },
    nested_parent = { "a/../../b", false },
    empty = { "", false },
)]
fn relative_path_check(path: &str, ok: bool) {
    assert_eq!(relative(path).is_ok(), ok);
}

#[tokio::test]
async fn fetches_project_archive_into_dest() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("alice/ws")).unwrap();
    std::fs::write(root.path().join("alice/ws/app.zip"), b"zip").unwrap();
    let store = LocalArtifactStore::new(root.path());

    let local = store
        .fetch_project_archive(&alice(), "ws", "app", scratch.path())
        .await
        .unwrap();
    assert_eq!(local, scratch.path().join("app.zip"));
    assert_eq!(std::fs::read(&local).unwrap(), b"zip");
}

#[tokio::test]
async fn missing_archive_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = LocalArtifactStore::new(root.path());

    let err = store
        .fetch_project_archive(&alice(), "ws", "ghost", scratch.path())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert!(err.is_input());
}

#[tokio::test]
async fn fetch_file_rejects_escape() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = LocalArtifactStore::new(root.path());

    let err = store.fetch_file(&alice(), "../bob/key.jks", scratch.path()).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidPath(_)));
}

#[tokio::test]
async fn uploads_file_under_requester_packages() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let apk = scratch.path().join("app-debug.apk");
    std::fs::write(&apk, b"apk").unwrap();
    let store = LocalArtifactStore::new(root.path());

    let remote = store
        .upload_artifact(&alice(), &apk, "ws/app/default", "app-default-debug.apk")
        .await
        .unwrap();
    assert_eq!(remote, "ws/app/default/app-default-debug.apk");
    let stored = root.path().join("alice/packages/ws/app/default/app-default-debug.apk");
    assert_eq!(std::fs::read(stored).unwrap(), b"apk");
}

#[tokio::test]
async fn uploads_directory_recursively() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let www = scratch.path().join("www");
    std::fs::create_dir_all(www.join("js")).unwrap();
    std::fs::write(www.join("index.html"), b"<html>").unwrap();
    std::fs::write(www.join("js/app.js"), b"run()").unwrap();
    let store = LocalArtifactStore::new(root.path());

    store.upload_artifact(&alice(), &www, "ws/app/web", "app-web-debug.www").await.unwrap();

    let stored = root.path().join("alice/packages/ws/app/web/app-web-debug.www");
    assert_eq!(std::fs::read(stored.join("index.html")).unwrap(), b"<html>");
    assert_eq!(std::fs::read(stored.join("js/app.js")).unwrap(), b"run()");
}

#[tokio::test]
async fn upload_filename_must_be_single_component() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let apk = scratch.path().join("a.apk");
    std::fs::write(&apk, b"apk").unwrap();
    let store = LocalArtifactStore::new(root.path());

    let err = store.upload_artifact(&alice(), &apk, "ws", "x/y.apk").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidPath(_)));
}

#[tokio::test]
async fn fake_store_records_and_reports_missing() {
    let scratch = tempfile::tempdir().unwrap();
    let store = FakeArtifactStore::new();
    store.set_missing("keystores/gone.jks");

    let path = store.fetch_file(&alice(), "keystores/ok.jks", scratch.path()).await.unwrap();
    assert!(path.ends_with("ok.jks"));
    assert!(path.exists());

    let err = store.fetch_file(&alice(), "keystores/gone.jks", scratch.path()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(store.calls().len(), 2);
}

#[tokio::test]
async fn fake_store_failure_is_io() {
    let store = FakeArtifactStore::new();
    store.fail("upload_artifact", "disk full");

    let err = store
        .upload_artifact(&alice(), Path::new("/tmp/x"), "ws/app/p", "x.apk")
        .await
        .unwrap_err();
    assert!(!err.is_input());
    assert_eq!(store.uploads(), vec![("ws/app/p".to_string(), "x.apk".to_string())]);
}
