// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker selection policies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the pool orders connected workers when placing a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Always the first connected slot, in connect order.
    First,
    /// Fewest outstanding jobs; ties go to the earlier slot.
    #[default]
    LeastLoaded,
}

impl SelectionPolicy {
    /// Indices into `loads` in the order they should be tried.
    pub fn rank(self, loads: &[usize]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..loads.len()).collect();
        if self == SelectionPolicy::LeastLoaded {
            // Stable sort keeps slot order among equals
            order.sort_by_key(|&i| loads[i]);
        }
        order
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first" => Ok(SelectionPolicy::First),
            "least-loaded" | "least_loaded" => Ok(SelectionPolicy::LeastLoaded),
            other => Err(format!("unknown selection policy {other:?} (expected first or least-loaded)")),
        }
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
