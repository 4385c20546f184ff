//! Application service: service lifecycle, scaling, storage and deletion.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};
use zcp_common::{Process, ServiceStack};

use crate::application::ports::PlatformClient;
use crate::domain::error::{ErrorCode, ZcpError};
use crate::domain::identifiers::resolve_service;
use crate::domain::scale::ScaleParams;

/// Message returned when the platform applies scaling without a process.
pub const SCALE_APPLIED_MESSAGE: &str = "Scaling parameters updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Stop,
    Restart,
    Reload,
}

impl LifecycleAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Reload => "reload",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub service_hostname: String,
    pub service_id: String,
}

/// Fetches the project's services and resolves `hostname` among them.
///
/// # Errors
///
/// Fails if the service list cannot be fetched, or with `SERVICE_NOT_FOUND`.
pub async fn find_service(
    client: &impl PlatformClient,
    project_id: &str,
    hostname: &str,
) -> Result<ServiceStack> {
    let services = client.list_services(project_id).await?;
    Ok(resolve_service(&services, hostname)?.clone())
}

/// Starts, stops, restarts or reloads a service.
///
/// # Errors
///
/// `SERVICE_NOT_FOUND`, or the platform error of the action.
pub async fn lifecycle(
    client: &impl PlatformClient,
    project_id: &str,
    hostname: &str,
    action: LifecycleAction,
) -> Result<Process> {
    let svc = find_service(client, project_id, hostname).await?;
    debug!(service = %svc.name, action = action.as_str(), "lifecycle action");
    match action {
        LifecycleAction::Start => client.start_service(&svc.id).await,
        LifecycleAction::Stop => client.stop_service(&svc.id).await,
        LifecycleAction::Restart => client.restart_service(&svc.id).await,
        LifecycleAction::Reload => client.reload_service(&svc.id).await,
    }
}

/// Applies the provided autoscaling fields. Parameters are validated
/// before any platform call.
///
/// # Errors
///
/// `INVALID_SCALING`, `SERVICE_NOT_FOUND`, or the platform error.
pub async fn scale(
    client: &impl PlatformClient,
    project_id: &str,
    hostname: &str,
    params: &ScaleParams,
) -> Result<ScaleResult> {
    params.validate()?;
    let svc = find_service(client, project_id, hostname).await?;

    let request = params.to_autoscaling(&svc.mode);
    let process = client.set_autoscaling(&svc.id, &request).await?;
    let message = if process.is_none() {
        SCALE_APPLIED_MESSAGE.to_string()
    } else {
        String::new()
    };
    Ok(ScaleResult {
        process,
        message,
        service_hostname: svc.name,
        service_id: svc.id,
    })
}

/// Attaches (`connect = true`) or detaches a shared storage service.
///
/// # Errors
///
/// `SERVICE_NOT_FOUND` for either hostname, or the platform error.
pub async fn storage(
    client: &impl PlatformClient,
    project_id: &str,
    hostname: &str,
    storage_hostname: &str,
    connect: bool,
) -> Result<Process> {
    let services = client.list_services(project_id).await?;
    let svc = resolve_service(&services, hostname)?;
    let storage = resolve_service(&services, storage_hostname)?;
    if connect {
        client.connect_storage(&svc.id, &storage.id).await
    } else {
        client.disconnect_storage(&svc.id, &storage.id).await
    }
}

/// Deletes a service. Requires explicit confirmation.
///
/// # Errors
///
/// `CONFIRM_REQUIRED` and `SERVICE_REQUIRED` before any platform call, then
/// `SERVICE_NOT_FOUND` or the platform error.
pub async fn delete(
    client: &impl PlatformClient,
    project_id: &str,
    hostname: &str,
    confirm: bool,
) -> Result<Process> {
    if !confirm {
        return Err(ZcpError::new(
            ErrorCode::ConfirmRequired,
            "Deletion requires confirmation",
            "Set confirm=true to proceed with deletion",
        )
        .into());
    }
    if hostname.is_empty() {
        return Err(ZcpError::new(
            ErrorCode::ServiceRequired,
            "Service hostname is required",
            "Provide serviceHostname parameter",
        )
        .into());
    }
    let svc = find_service(client, project_id, hostname).await?;
    info!(service = %svc.name, "deleting service");
    client.delete_service(&svc.id).await
}
