// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin reconciliation.

/// Plugins the build cannot work without; never removed even when the
/// profile does not ask for them.
pub const PROTECTED_PLUGINS: &[&str] = &["cordova-plugin-whitelist", "cordova-plugin-compat"];

/// Changes that bring an installed plugin set in line with a desired one.
///
/// Removal runs before addition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginPlan {
    pub to_remove: Vec<String>,
    pub to_add: Vec<String>,
}

impl PluginPlan {
    /// - `to_remove`: installed, not desired, not protected.
    /// - `to_add`: desired, not installed (deduplicated, order kept).
    pub fn compute(installed: &[String], desired: &[String], protected: &[&str]) -> Self {
        let to_remove = installed
            .iter()
            .filter(|p| !desired.contains(p) && !protected.contains(&p.as_str()))
            .cloned()
            .collect();

        let mut to_add: Vec<String> = Vec::new();
        for plugin in desired {
            if !installed.contains(plugin) && !to_add.contains(plugin) {
                to_add.push(plugin.clone());
            }
        }
        Self { to_remove, to_add }
    }

    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// The installed set after this plan runs.
    pub fn apply(&self, installed: &[String]) -> Vec<String> {
        let mut after: Vec<String> =
            installed.iter().filter(|p| !self.to_remove.contains(p)).cloned().collect();
        after.extend(self.to_add.iter().cloned());
        after
    }
}

#[cfg(test)]
#[path = "plugins_tests.rs"]
mod tests;
