//! Application service: mounting service filesystems locally.
//!
//! The `*_hostname` functions work on a validated hostname alone and back
//! the offline CLI. The `*_service` variants first check that the hostname
//! belongs to the project.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::ports::{Mounter, PlatformClient};
use crate::domain::error::{ErrorCode, ZcpError};
use crate::domain::identifiers::resolve_service;
use crate::domain::mount::{MountInfo, MountResult, MountStatus, mount_path, validate_mount_hostname};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountStatusResult {
    pub mounts: Vec<MountInfo>,
}

async fn writable(mounter: &impl Mounter, path: &str) -> bool {
    mounter.is_writable(path).await.unwrap_or_else(|e| {
        debug!(path, error = %e, "writability probe failed");
        false
    })
}

/// Mounts `hostname` at `/var/www/<hostname>`; an existing mount is
/// reported as `ALREADY_MOUNTED` without remounting.
///
/// # Errors
///
/// `SERVICE_REQUIRED` / `INVALID_HOSTNAME` before touching the mounter,
/// `MOUNT_FAILED` when the status check or the mount fails.
pub async fn mount_hostname(mounter: &impl Mounter, hostname: &str) -> Result<MountResult> {
    validate_mount_hostname(hostname)?;
    let path = mount_path(hostname);

    let mounted = mounter.is_mounted(&path).await.map_err(|e| {
        ZcpError::new(
            ErrorCode::MountFailed,
            format!("Failed to check mount status for {hostname}: {e}"),
            "Check if the service is accessible",
        )
    })?;
    if mounted {
        let writable = writable(mounter, &path).await;
        return Ok(MountResult::new(MountStatus::AlreadyMounted, hostname, writable));
    }

    mounter.mount(hostname, &path).await.map_err(|e| {
        ZcpError::new(
            ErrorCode::MountFailed,
            format!("Failed to mount {hostname}: {e}"),
            "Verify SSHFS is available and the service is running",
        )
    })?;
    info!(hostname, path, "mounted");
    let writable = writable(mounter, &path).await;
    Ok(MountResult::new(MountStatus::Mounted, hostname, writable))
}

/// Unmounts `hostname`; a path that is not mounted yields `NOT_MOUNTED`.
///
/// # Errors
///
/// Hostname validation errors, or `UNMOUNT_FAILED`.
pub async fn unmount_hostname(mounter: &impl Mounter, hostname: &str) -> Result<MountResult> {
    validate_mount_hostname(hostname)?;
    let path = mount_path(hostname);

    let mounted = mounter.is_mounted(&path).await.map_err(|e| {
        ZcpError::new(
            ErrorCode::UnmountFailed,
            format!("Failed to check mount status for {hostname}: {e}"),
            "Check mount state manually",
        )
    })?;
    if !mounted {
        return Ok(MountResult::new(MountStatus::NotMounted, hostname, false));
    }

    mounter.unmount(hostname, &path).await.map_err(|e| {
        ZcpError::new(
            ErrorCode::UnmountFailed,
            format!("Failed to unmount {hostname}: {e}"),
            "Try fusermount -u manually",
        )
    })?;
    info!(hostname, path, "unmounted");
    Ok(MountResult::new(MountStatus::Unmounted, hostname, false))
}

/// Mount state of each hostname. Status checks never fail: an error reads
/// as not mounted, and writability is probed only for mounted paths.
pub async fn mount_infos<S: AsRef<str>>(mounter: &impl Mounter, hostnames: &[S]) -> MountStatusResult {
    let mut mounts = Vec::with_capacity(hostnames.len());
    for hostname in hostnames {
        let hostname = hostname.as_ref();
        let path = mount_path(hostname);
        let mounted = match mounter.is_mounted(&path).await {
            Ok(m) => m,
            Err(e) => {
                warn!(hostname, error = %e, "mount status check failed");
                false
            }
        };
        let writable = if mounted { writable(mounter, &path).await } else { false };
        mounts.push(MountInfo {
            hostname: hostname.to_string(),
            mount_path: path,
            mounted,
            writable,
        });
    }
    MountStatusResult { mounts }
}

/// [`mount_hostname`] for a service of the project.
///
/// # Errors
///
/// Adds `SERVICE_NOT_FOUND` to the errors of [`mount_hostname`].
pub async fn mount_service(
    client: &impl PlatformClient,
    project_id: &str,
    mounter: &impl Mounter,
    hostname: &str,
) -> Result<MountResult> {
    validate_mount_hostname(hostname)?;
    let services = client.list_services(project_id).await?;
    resolve_service(&services, hostname)?;
    mount_hostname(mounter, hostname).await
}

/// [`unmount_hostname`]. The service may already be gone from the
/// project, so the hostname is not resolved.
///
/// # Errors
///
/// Same as [`unmount_hostname`].
pub async fn unmount_service(mounter: &impl Mounter, hostname: &str) -> Result<MountResult> {
    unmount_hostname(mounter, hostname).await
}

/// Mount state for `hostname`, or for every non-system service of the
/// project when none is given.
///
/// # Errors
///
/// Hostname validation errors, or a failed service listing.
pub async fn mount_status(
    client: &impl PlatformClient,
    project_id: &str,
    mounter: &impl Mounter,
    hostname: Option<&str>,
) -> Result<MountStatusResult> {
    if let Some(hostname) = hostname.filter(|h| !h.is_empty()) {
        validate_mount_hostname(hostname)?;
        return Ok(mount_infos(mounter, &[hostname]).await);
    }
    let services = client.list_services(project_id).await?;
    let hostnames: Vec<&str> = services
        .iter()
        .filter(|s| !s.is_system())
        .map(|s| s.name.as_str())
        .collect();
    Ok(mount_infos(mounter, &hostnames).await)
}
