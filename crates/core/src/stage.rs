// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline stages and their fixed order.

use serde::{Deserialize, Serialize};

use crate::profile::BuildProfile;

/// One named phase of the build pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    DownloadSource,
    PlatformAdd,
    PluginReconcile,
    Build,
    Signing,
    UploadPackage,
    Completed,
}

crate::simple_display! {
    Stage {
        Init => "init",
        DownloadSource => "download_source",
        PlatformAdd => "platform_add",
        PluginReconcile => "plugin_reconcile",
        Build => "build",
        Signing => "signing",
        UploadPackage => "upload_package",
        Completed => "completed",
    }
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Init,
        Stage::DownloadSource,
        Stage::PlatformAdd,
        Stage::PluginReconcile,
        Stage::Build,
        Stage::Signing,
        Stage::UploadPackage,
        Stage::Completed,
    ];

    /// The stage that follows this one under `plan`, skipping conditional
    /// stages the plan leaves out. `None` after `Completed`.
    pub fn next(self, plan: StagePlan) -> Option<Stage> {
        Stage::ALL
            .iter()
            .copied()
            .skip_while(|s| *s != self)
            .skip(1)
            .find(|s| plan.includes(*s))
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Completed
    }
}

/// Which conditional stages a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StagePlan {
    pub plugins: bool,
    pub signing: bool,
}

impl StagePlan {
    pub fn for_profile(profile: &BuildProfile) -> Self {
        Self { plugins: !profile.plugins.is_empty(), signing: profile.is_signed_release() }
    }

    pub fn includes(self, stage: Stage) -> bool {
        match stage {
            Stage::PluginReconcile => self.plugins,
            Stage::Signing => self.signing,
            _ => true,
        }
    }

    /// Every stage this plan enters, in order.
    pub fn stages(self) -> Vec<Stage> {
        Stage::ALL.iter().copied().filter(|s| self.includes(*s)).collect()
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
