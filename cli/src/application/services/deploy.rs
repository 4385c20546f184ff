//! Application service: build-and-deploy orchestration.
//!
//! Two modes. With a source service the build is driven over SSH from that
//! container; otherwise `zcli` pushes the local working directory.

use std::path::Path;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zcp_common::AppVersionEvent;

use crate::application::ports::{
    GitPreparer, LocalAgentExecutor, LocalFs, PlatformClient, ProgressReporter, ShellExecutor,
};
use crate::application::services::poll::{Backoff, poll_build};
use crate::domain::deploy::{
    DEFAULT_WORKING_DIR, DeployMode, DeployResult, DeployStatus, MONITOR_HINT, SshDeployCommand,
    build_ssh_command, build_zcli_args, classify_ssh_failure, is_build_triggered,
};
use crate::domain::error::{ErrorCode, ZcpError, error_code};
use crate::domain::identifiers::resolve_service;
use crate::domain::timeline::duration_between;
use crate::domain::validate::deploy_warnings;

const ZEROPS_YML_NAMES: &[&str] = &["zerops.yml", "zerops.yaml"];

/// Session-wide deploy settings. `token` and `region` are forwarded to
/// `zcli login` on the source container.
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub token: String,
    pub region: String,
    /// Source directory for SSH deploys that name none.
    pub working_dir: String,
}

impl Default for DeployContext {
    fn default() -> Self {
        Self {
            token: String::new(),
            region: String::new(),
            working_dir: DEFAULT_WORKING_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployRequest<'a> {
    /// SSH mode when set.
    pub source_service: Option<&'a str>,
    pub target_service: Option<&'a str>,
    /// Command run on the source container before the push.
    pub setup: Option<&'a str>,
    pub working_dir: Option<&'a str>,
    pub include_git: bool,
    pub fresh_git: bool,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn triggered(
    mode: DeployMode,
    source: Option<&str>,
    target: &str,
    target_id: &str,
    message: String,
) -> DeployResult {
    DeployResult {
        status: DeployStatus::BuildTriggered,
        mode,
        source_service: source.map(str::to_string),
        target_service: target.to_string(),
        target_service_id: target_id.to_string(),
        message,
        monitor_hint: MONITOR_HINT.to_string(),
        suggestion: String::new(),
        warnings: Vec::new(),
        build_status: String::new(),
        build_duration: String::new(),
        timed_out: false,
    }
}

/// Warnings about the `zerops.yml` in `working_dir` for `hostname`.
///
/// Looks for `zerops.yml`, then `zerops.yaml`. A missing or unreadable file
/// is itself a warning.
#[must_use]
pub fn preflight_zerops_yml(fs: &impl LocalFs, working_dir: &Path, hostname: &str) -> Vec<String> {
    let Some(path) = ZEROPS_YML_NAMES
        .iter()
        .map(|name| working_dir.join(name))
        .find(|p| fs.exists(p))
    else {
        return vec![format!(
            "zerops.yml not found at {}",
            working_dir.join(ZEROPS_YML_NAMES[0]).display()
        )];
    };
    let location = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    match fs.read_to_string(&path) {
        Ok(content) => deploy_warnings(&content, &location, hostname),
        Err(e) => vec![format!("cannot read {}: {e}", path.display())],
    }
}

/// Triggers a build and returns as soon as the platform accepted it.
///
/// # Errors
///
/// - `INVALID_PARAMETER` when neither service is named
/// - `NOT_IMPLEMENTED` when the executor for the selected mode is missing
/// - `SERVICE_NOT_FOUND` for an unknown hostname
/// - `SSH_DEPLOY_FAILED` (classified) or `API_ERROR` when the push fails
#[allow(clippy::too_many_arguments)]
pub async fn deploy<S, L>(
    client: &impl PlatformClient,
    project_id: &str,
    deploy_ctx: &DeployContext,
    ssh: Option<&S>,
    local: Option<&L>,
    fs: &impl LocalFs,
    request: &DeployRequest<'_>,
) -> Result<DeployResult>
where
    S: ShellExecutor,
    L: LocalAgentExecutor + GitPreparer,
{
    let source = non_empty(request.source_service);
    let target = non_empty(request.target_service);

    match (source, target) {
        (Some(source), Some(target)) => {
            let Some(ssh) = ssh else {
                return Err(ZcpError::new(
                    ErrorCode::NotImplemented,
                    "SSH deploy is not available (deployer not configured)",
                    "SSH deploy requires a running Zerops container with SSH access",
                )
                .into());
            };
            deploy_ssh(client, project_id, deploy_ctx, ssh, source, target, request).await
        }
        (Some(_), None) => Err(ZcpError::new(
            ErrorCode::InvalidParameter,
            "targetService is required for SSH deploy",
            "Provide sourceService + targetService for SSH deploy",
        )
        .into()),
        (None, Some(target)) => {
            let Some(local) = local else {
                return Err(ZcpError::new(
                    ErrorCode::NotImplemented,
                    "Local deploy is not available (deployer not configured)",
                    "Local deploy requires zcli to be installed",
                )
                .into());
            };
            deploy_local(client, project_id, local, fs, target, request).await
        }
        (None, None) => Err(ZcpError::new(
            ErrorCode::InvalidParameter,
            "Either sourceService (SSH mode) or targetService (local mode) is required",
            "Provide sourceService + targetService for SSH deploy, or targetService for local deploy",
        )
        .into()),
    }
}

async fn deploy_ssh(
    client: &impl PlatformClient,
    project_id: &str,
    deploy_ctx: &DeployContext,
    ssh: &impl ShellExecutor,
    source: &str,
    target: &str,
    request: &DeployRequest<'_>,
) -> Result<DeployResult> {
    let services = client.list_services(project_id).await?;
    let source_svc = resolve_service(&services, source)?;
    let target_svc = resolve_service(&services, target)?;

    let command = build_ssh_command(&SshDeployCommand {
        token: &deploy_ctx.token,
        region: &deploy_ctx.region,
        setup: request.setup,
        working_dir: non_empty(request.working_dir).unwrap_or(&deploy_ctx.working_dir),
        target_service_id: &target_svc.id,
        include_git: request.include_git,
        fresh_git: request.fresh_git,
    });
    debug!(source, target, "running remote deploy");

    let failure = match ssh.exec_ssh(&source_svc.name, &command).await {
        Ok(out) if out.failure.is_none() || is_build_triggered(&out.combined) => None,
        Ok(out) => Some(format!(
            "{}\n{}",
            out.failure.unwrap_or_default(),
            out.combined.trim()
        )),
        Err(e) => Some(format!("{e:#}")),
    };
    if let Some(message) = failure {
        warn!(source, target, "remote deploy failed");
        return Err(classify_ssh_failure(message.trim(), source, target).into());
    }

    info!(source, target, "build triggered");
    Ok(triggered(
        DeployMode::Ssh,
        Some(source),
        target,
        &target_svc.id,
        format!("Build triggered from {source} to {target} via SSH"),
    ))
}

async fn deploy_local(
    client: &impl PlatformClient,
    project_id: &str,
    local: &(impl LocalAgentExecutor + GitPreparer),
    fs: &impl LocalFs,
    target: &str,
    request: &DeployRequest<'_>,
) -> Result<DeployResult> {
    let services = client.list_services(project_id).await?;
    let target_svc = resolve_service(&services, target)?;

    let working_dir = non_empty(request.working_dir);
    let dir = Path::new(working_dir.unwrap_or("."));
    let warnings = preflight_zerops_yml(fs, dir, target);
    if fs.exists(dir) {
        local.ensure_repository(dir, request.fresh_git).await?;
    }

    let args = build_zcli_args(&target_svc.id, working_dir, request.include_git);
    let out = local.exec_local_agent(&args).await?;
    if let Some(failure) = out.failure {
        return Err(ZcpError::new(
            ErrorCode::ApiError,
            format!("Local deploy to {target} failed: {failure}\n{}", out.combined.trim()),
            "Check the zcli output above and that zerops.yml has a setup entry for the service",
        )
        .into());
    }

    info!(target, "build triggered");
    let mut result = triggered(
        DeployMode::Local,
        None,
        target,
        &target_svc.id,
        format!("Build triggered for {target} via local zcli"),
    );
    result.warnings = warnings;
    Ok(result)
}

/// Pipeline duration from start to finish (or failure), if recorded.
#[must_use]
pub fn build_duration(event: &AppVersionEvent) -> String {
    let Some(build) = &event.build else {
        return String::new();
    };
    let end = build
        .pipeline_finish
        .as_deref()
        .or(build.pipeline_failed.as_deref());
    duration_between(build.pipeline_start.as_deref(), end)
}

/// Folds the final app version of a build into a triggered deploy result.
pub fn apply_build_outcome(result: &mut DeployResult, event: &AppVersionEvent) {
    result.build_status.clone_from(&event.status);
    result.build_duration = build_duration(event);
    match event.status.as_str() {
        "ACTIVE" => {
            result.status = DeployStatus::Deployed;
            result.monitor_hint.clear();
            result.message = format!("Successfully deployed to {}", result.target_service);
        }
        "BUILD_FAILED" => {
            result.status = DeployStatus::BuildFailed;
            result.suggestion = "Check build logs with zerops_logs for details".to_string();
        }
        _ => {}
    }
}

/// [`deploy`], then waits for the target's build to finish.
///
/// A build poll timeout is not an error: the result stays
/// `BUILD_TRIGGERED` with `timedOut` set.
///
/// # Errors
///
/// Everything [`deploy`] returns, plus [`crate::domain::error::Canceled`]
/// and platform errors raised while polling.
#[allow(clippy::too_many_arguments)]
pub async fn deploy_and_wait<S, L>(
    client: &impl PlatformClient,
    project_id: &str,
    deploy_ctx: &DeployContext,
    ssh: Option<&S>,
    local: Option<&L>,
    fs: &impl LocalFs,
    request: &DeployRequest<'_>,
    backoff: Backoff,
    cancel: &CancellationToken,
    progress: Option<&dyn ProgressReporter>,
) -> Result<DeployResult>
where
    S: ShellExecutor,
    L: LocalAgentExecutor + GitPreparer,
{
    let mut result = deploy(client, project_id, deploy_ctx, ssh, local, fs, request).await?;

    match poll_build(
        client,
        project_id,
        &result.target_service_id,
        backoff,
        cancel,
        progress,
    )
    .await
    {
        Ok(event) => apply_build_outcome(&mut result, &event),
        Err(e) if error_code(&e) == Some(ErrorCode::ApiTimeout) => {
            warn!(target = %result.target_service, "build poll timed out");
            result.timed_out = true;
        }
        Err(e) => return Err(e),
    }
    Ok(result)
}
