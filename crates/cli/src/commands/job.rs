// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job command handlers: submit and status

use anyhow::Result;
use clap::Args;
use sw_core::{
    BuildKind, BuildProfile, JobId, JobKind, KeystoreInfo, Platform, ProgressEvent,
    Requester, SigningDescriptor,
};

use crate::client::HubClient;
use crate::exit_error::{ExitError, JOB_FAILED};
use crate::output::{print_event, OutputFormat};

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Wipe the working area before building
    #[arg(long, conflicts_with = "clean")]
    pub rebuild: bool,
    /// Remove the working area instead of building
    #[arg(long)]
    pub clean: bool,

    /// Profile name (part of the working area and upload path)
    #[arg(long, default_value = "default")]
    pub profile: String,
    #[arg(long)]
    pub workspace: String,
    #[arg(long)]
    pub project: String,
    #[arg(long, default_value = "android")]
    pub platform: String,
    /// Release build (debug otherwise)
    #[arg(long)]
    pub release: bool,
    /// Desired plugin ids, repeatable or comma-separated
    #[arg(long = "plugin", value_delimiter = ',')]
    pub plugins: Vec<String>,

    #[arg(long, env = "SW_REQUESTER")]
    pub requester: String,
    /// Opaque credential passed to the artifact store
    #[arg(long, env = "SW_CREDENTIAL", hide_env_values = true)]
    pub credential: Option<String>,

    /// Keystore alias; signs a release build
    #[arg(long, requires = "release")]
    pub sign: Option<String>,
    /// Keystore file name
    #[arg(long, requires = "sign")]
    pub keystore: Option<String>,
    /// Keystore location in the artifact store (default keystores/<name>)
    #[arg(long, requires = "sign")]
    pub keystore_path: Option<String>,
    #[arg(long, env = "SW_STORE_PASSWORD", hide_env_values = true)]
    pub store_password: Option<String>,
    #[arg(long, env = "SW_KEY_PASSWORD", hide_env_values = true)]
    pub key_password: Option<String>,
    /// Key alias inside the keystore (default: the --sign alias)
    #[arg(long, requires = "sign")]
    pub key_alias: Option<String>,

    /// Toolchain metadata as a JSON object
    #[arg(long, value_parser = parse_json)]
    pub platform_info: Option<serde_json::Value>,

    /// Stream progress until the job finishes
    #[arg(long, short)]
    pub follow: bool,
}

fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

impl SubmitArgs {
    pub fn kind(&self) -> JobKind {
        if self.clean {
            JobKind::Clean
        } else if self.rebuild {
            JobKind::Rebuild
        } else {
            JobKind::Build
        }
    }

    pub fn profile(&self) -> BuildProfile {
        let signing = self.sign.as_ref().map(|alias| SigningDescriptor {
            alias: alias.clone(),
            keystore: Some(KeystoreInfo {
                filename: self.keystore.clone(),
                remote_path: self.keystore_path.clone(),
                store_password: self.store_password.clone().unwrap_or_default(),
                key_password: self.key_password.clone(),
                key_alias: self.key_alias.clone(),
            }),
        });
        BuildProfile {
            name: self.profile.clone(),
            workspace: self.workspace.clone(),
            project: self.project.clone(),
            platform: Platform::from(self.platform.as_str()),
            build: if self.release { BuildKind::Release } else { BuildKind::Debug },
            plugins: self.plugins.clone(),
            signing,
        }
    }

    pub fn requester(&self) -> Requester {
        let requester = Requester::new(&self.requester);
        match &self.credential {
            Some(credential) => requester.with_credential(credential),
            None => requester,
        }
    }
}

pub async fn submit(args: SubmitArgs, client: &HubClient, format: OutputFormat) -> Result<()> {
    let platform_info = args.platform_info.clone().unwrap_or(serde_json::Value::Null);
    let job_id =
        client.submit(args.kind(), args.profile(), platform_info, args.requester()).await?;
    match format {
        OutputFormat::Text => println!("Submitted {job_id}"),
        OutputFormat::Json => println!("{}", serde_json::json!({ "job_id": job_id })),
    }
    if args.follow {
        status(&job_id, client, format).await?;
    }
    Ok(())
}

/// Replay and follow a job until it finishes. A failed or aborted job
/// exits with [`JOB_FAILED`].
pub async fn status(job_id: &JobId, client: &HubClient, format: OutputFormat) -> Result<()> {
    let terminal = client.follow(job_id, |event| print_event(event, format)).await?;
    check_terminal(&terminal)
}

fn check_terminal(event: &ProgressEvent) -> Result<()> {
    if event.is_unsuccessful() {
        return Err(ExitError::new(JOB_FAILED, "").into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
