// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job execution: build, rebuild, clean.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use sw_adapters::{ArtifactStore, Toolchain};
use sw_core::{
    Job, JobKind, JobOutcome, ProgressEvent, ProgressSink, Stage, StagePlan, TargetKey,
};
use tokio_util::sync::CancellationToken;

use crate::artifact::{artifact_filename, find_artifact};
use crate::error::StageError;
use crate::layout::{remove_dir_if_present, WorkLayout};
use crate::lock::{LockTable, TargetLock};
use crate::machine::{NextAction, StageMachine};
use crate::plugins::{PluginPlan, PROTECTED_PLUGINS};
use crate::signing::sign_artifact;

/// Mutable state carried from stage to stage within one job.
struct BuildContext<'a> {
    job: &'a Job,
    project: PathBuf,
    scratch: PathBuf,
    artifact: Option<PathBuf>,
    uploaded: Option<String>,
}

/// Executes jobs against a toolchain and an artifact store.
///
/// Cheap to clone; clones share the lock table and cancellation token.
#[derive(Clone)]
pub struct Runner<T, S> {
    tools: T,
    store: S,
    locks: Arc<LockTable>,
    layout: WorkLayout,
    cancel: CancellationToken,
}

impl<T: Toolchain, S: ArtifactStore> Runner<T, S> {
    pub fn new(tools: T, store: S, layout: WorkLayout) -> Self {
        Self {
            tools,
            store,
            locks: Arc::new(LockTable::new()),
            layout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn locks(&self) -> &Arc<LockTable> {
        &self.locks
    }

    pub fn layout(&self) -> &WorkLayout {
        &self.layout
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run `job` to a terminal outcome, dispatching on its kind.
    pub async fn handle(&self, job: &Job, sink: &dyn ProgressSink) -> JobOutcome {
        let started = Instant::now();
        tracing::info!(job_id = %job.id, kind = %job.kind, "job started");
        let outcome = match job.kind {
            JobKind::Build => self.handle_build(job, sink).await,
            JobKind::Rebuild => self.handle_rebuild(job, sink).await,
            JobKind::Clean => self.handle_clean(job, sink).await,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            JobOutcome::Succeeded { artifact } => {
                tracing::info!(job_id = %job.id, artifact = ?artifact, elapsed_ms, "job succeeded")
            }
            JobOutcome::Failed { stage, kind, reason } => tracing::warn!(
                job_id = %job.id,
                %stage,
                %kind,
                reason = %reason,
                elapsed_ms,
                "job failed"
            ),
            JobOutcome::Aborted { reason } => {
                tracing::info!(job_id = %job.id, reason = %reason, "job aborted")
            }
        }
        outcome
    }

    pub async fn handle_build(&self, job: &Job, sink: &dyn ProgressSink) -> JobOutcome {
        let key = match self.target_key(job, sink) {
            Ok(key) => key,
            Err(outcome) => return outcome,
        };
        let Some(lock) = self.locks.try_acquire(&key) else {
            return JobOutcome::already_running();
        };
        self.run_pipeline(job, &key, lock, sink).await
    }

    /// Clean then build under one continuous hold of the target lock.
    pub async fn handle_rebuild(&self, job: &Job, sink: &dyn ProgressSink) -> JobOutcome {
        let key = match self.target_key(job, sink) {
            Ok(key) => key,
            Err(outcome) => return outcome,
        };
        let Some(lock) = self.locks.try_acquire(&key) else {
            return JobOutcome::already_running();
        };
        if let Err(e) = self.layout.remove_target(&key).await {
            drop(lock);
            return fail(job, Stage::Init, StageError::Clean(e.to_string()), sink);
        }
        self.run_pipeline(job, &key, lock, sink).await
    }

    pub async fn handle_clean(&self, job: &Job, sink: &dyn ProgressSink) -> JobOutcome {
        let key = match self.target_key(job, sink) {
            Ok(key) => key,
            Err(outcome) => return outcome,
        };
        let Some(lock) = self.locks.try_acquire(&key) else {
            return JobOutcome::already_running();
        };
        let result = self.layout.remove_target(&key).await;
        drop(lock);
        match result {
            Ok(removed) => {
                tracing::debug!(job_id = %job.id, target_key = %key, removed, "cleaned target");
                sink.publish(ProgressEvent::success(&job.id, None));
                JobOutcome::Succeeded { artifact: None }
            }
            Err(e) => fail(job, Stage::Init, StageError::Clean(e.to_string()), sink),
        }
    }

    /// Validate the job before touching the lock table.
    fn target_key(&self, job: &Job, sink: &dyn ProgressSink) -> Result<TargetKey, JobOutcome> {
        job.target_key().map_err(|e| fail(job, Stage::Init, e.into(), sink))
    }

    async fn run_pipeline(
        &self,
        job: &Job,
        key: &TargetKey,
        lock: TargetLock,
        sink: &dyn ProgressSink,
    ) -> JobOutcome {
        let mut ctx = BuildContext {
            job,
            project: self.layout.target_dir(key),
            scratch: self.layout.scratch_dir(&job.id),
            artifact: None,
            uploaded: None,
        };
        let mut machine = StageMachine::new(StagePlan::for_profile(&job.profile));
        let mut action = machine.advance(Ok(()));

        let outcome = loop {
            match action {
                NextAction::Enter(stage) => {
                    if self.cancel.is_cancelled() {
                        action = machine.advance(Err(StageError::Cancelled(stage)));
                        continue;
                    }
                    tracing::debug!(job_id = %job.id, %stage, "entering stage");
                    sink.publish(ProgressEvent::progress(&job.id, stage));
                    let result = self.run_stage(stage, &mut ctx).await;
                    action = machine.advance(result);
                }
                NextAction::Complete => {
                    break JobOutcome::Succeeded { artifact: ctx.uploaded.take() };
                }
                NextAction::Fail { stage, error } => {
                    break JobOutcome::Failed { stage, kind: error.kind(), reason: error.to_string() };
                }
            }
        };

        if let Err(e) = remove_dir_if_present(&ctx.scratch).await {
            tracing::warn!(job_id = %job.id, error = %e, "failed to remove scratch dir");
        }
        // The target is free again before anyone hears the job is over.
        drop(lock);
        sink.publish(ProgressEvent::from_outcome(&job.id, &outcome));
        outcome
    }

    async fn run_stage(&self, stage: Stage, ctx: &mut BuildContext<'_>) -> Result<(), StageError> {
        let job = ctx.job;
        let profile = &job.profile;
        match stage {
            Stage::Init => {
                tokio::fs::create_dir_all(&ctx.project)
                    .await
                    .map_err(|e| StageError::Tool(format!("create working area: {e}")))?;
                tokio::fs::create_dir_all(&ctx.scratch)
                    .await
                    .map_err(|e| StageError::Tool(format!("create scratch dir: {e}")))
            }
            Stage::DownloadSource => {
                let archive = self
                    .store
                    .fetch_project_archive(
                        &job.requester,
                        &profile.workspace,
                        &profile.project,
                        &ctx.scratch,
                    )
                    .await?;
                self.tools.extract_archive(&archive, &ctx.project).await?;
                Ok(())
            }
            Stage::PlatformAdd => {
                let scaffold = ctx.project.join("platforms").join(profile.platform.as_str());
                if tokio::fs::metadata(&scaffold).await.is_ok_and(|m| m.is_dir()) {
                    tracing::debug!(job_id = %job.id, platform = %profile.platform, "platform already added");
                    return Ok(());
                }
                self.tools.add_platform(&ctx.project, &profile.platform).await?;
                Ok(())
            }
            Stage::PluginReconcile => {
                let installed = self.tools.installed_plugins(&ctx.project).await?;
                let plan = PluginPlan::compute(&installed, &profile.plugin_set(), PROTECTED_PLUGINS);
                tracing::debug!(
                    job_id = %job.id,
                    remove = ?plan.to_remove,
                    add = ?plan.to_add,
                    "reconciling plugins"
                );
                if !plan.to_remove.is_empty() {
                    self.tools.remove_plugins(&ctx.project, &plan.to_remove).await?;
                }
                if !plan.to_add.is_empty() {
                    self.tools.add_plugins(&ctx.project, &plan.to_add).await?;
                }
                Ok(())
            }
            Stage::Build => {
                self.tools.build(&ctx.project, &profile.platform, profile.build).await?;
                let artifact =
                    find_artifact(ctx.project.clone(), profile.platform.clone(), profile.build)
                        .await?;
                ctx.artifact = Some(artifact);
                Ok(())
            }
            Stage::Signing => {
                let (Some(signing), Some(unsigned)) = (&profile.signing, &ctx.artifact) else {
                    return Err(StageError::Input("signing requested without a built artifact".into()));
                };
                let signed = sign_artifact(
                    &self.tools,
                    &self.store,
                    &job.requester,
                    signing,
                    unsigned,
                    &ctx.scratch,
                )
                .await?;
                ctx.artifact = Some(signed);
                Ok(())
            }
            Stage::UploadPackage => {
                let Some(artifact) = &ctx.artifact else {
                    return Err(StageError::Tool("nothing to upload".into()));
                };
                let filename = artifact_filename(profile, artifact);
                let remote_dir =
                    format!("{}/{}/{}", profile.workspace, profile.project, profile.name);
                self.store
                    .upload_artifact(&job.requester, artifact, &remote_dir, &filename)
                    .await?;
                ctx.uploaded = Some(filename);
                Ok(())
            }
            Stage::Completed => Ok(()),
        }
    }
}

/// Terminal failure outside the stage loop (validation, clean).
fn fail(job: &Job, stage: Stage, error: StageError, sink: &dyn ProgressSink) -> JobOutcome {
    let outcome = JobOutcome::Failed { stage, kind: error.kind(), reason: error.to_string() };
    sink.publish(ProgressEvent::from_outcome(&job.id, &outcome));
    outcome
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
