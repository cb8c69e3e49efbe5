// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn key(profile: &str) -> TargetKey {
    TargetKey {
        requester: "alice".into(),
        workspace: "ws".into(),
        project: "app".into(),
        profile: profile.into(),
    }
}

#[test]
fn second_acquire_fails_while_held() {
    let table = Arc::new(LockTable::new());
    let guard = table.try_acquire(&key("p")).unwrap();
    assert!(table.try_acquire(&key("p")).is_none());
    assert_eq!(guard.key(), &key("p"));
    assert!(table.is_held(&key("p")));
}

#[test]
fn different_targets_do_not_conflict() {
    let table = Arc::new(LockTable::new());
    let _a = table.try_acquire(&key("a")).unwrap();
    let _b = table.try_acquire(&key("b")).unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn drop_releases_and_key_is_reacquirable() {
    let table = Arc::new(LockTable::new());
    drop(table.try_acquire(&key("p")).unwrap());
    assert!(table.is_empty());
    assert!(table.try_acquire(&key("p")).is_some());
}

#[test]
fn stale_token_does_not_release_new_holder() {
    let table = Arc::new(LockTable::new());
    let first = table.try_acquire(&key("p")).unwrap();
    let stale_token = first.token;
    drop(first);

    let _second = table.try_acquire(&key("p")).unwrap();
    assert!(!table.release(&key("p"), stale_token));
    assert!(table.is_held(&key("p")));
}

#[test]
fn release_of_free_key_is_noop() {
    let table = LockTable::new();
    assert!(!table.release(&key("p"), 0));
}

#[test]
fn concurrent_acquire_has_single_winner() {
    let table = Arc::new(LockTable::new());
    let barrier = Arc::new(std::sync::Barrier::new(16));
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let table = Arc::clone(&table);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                // Keep the guard alive so later threads see it held
                table.try_acquire(&key("p")).map(std::mem::forget).is_some()
            })
        })
        .collect();

    let winners = handles.into_iter().map(|h| h.join().unwrap()).filter(|won| *won).count();
    assert_eq!(winners, 1);
}
