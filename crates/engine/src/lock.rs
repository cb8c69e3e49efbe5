// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-target mutual exclusion.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sw_core::TargetKey;

/// In-memory exclusion table keyed by [`TargetKey`].
///
/// Starts empty on every process start; a crash mid-job drops its lock.
#[derive(Debug, Default)]
pub struct LockTable {
    held: Mutex<HashMap<TargetKey, u64>>,
    next_token: AtomicU64,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `key` if it is free. Exactly one of any number of concurrent
    /// callers for the same key gets a guard.
    pub fn try_acquire(self: &Arc<Self>, key: &TargetKey) -> Option<TargetLock> {
        let mut held = self.held.lock();
        if held.contains_key(key) {
            return None;
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        held.insert(key.clone(), token);
        Some(TargetLock { table: Arc::clone(self), key: key.clone(), token })
    }

    /// Free `key` if `token` still owns it. Safe to call when free or
    /// when someone else has since taken the key.
    fn release(&self, key: &TargetKey, token: u64) -> bool {
        let mut held = self.held.lock();
        if held.get(key) == Some(&token) {
            held.remove(key);
            true
        } else {
            false
        }
    }

    pub fn is_held(&self, key: &TargetKey) -> bool {
        self.held.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.held.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.lock().is_empty()
    }
}

/// A held target. Released exactly once, when dropped.
#[derive(Debug)]
pub struct TargetLock {
    table: Arc<LockTable>,
    key: TargetKey,
    token: u64,
}

impl TargetLock {
    pub fn key(&self) -> &TargetKey {
        &self.key
    }
}

impl Drop for TargetLock {
    fn drop(&mut self) {
        if self.table.release(&self.key, self.token) {
            tracing::debug!(target_key = %self.key, "released target lock");
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
