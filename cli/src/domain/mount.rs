//! Mount paths, hostname guard and mount results.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::error::{ErrorCode, ZcpError};

/// Directory under which service filesystems are mounted.
pub const MOUNT_BASE: &str = "/var/www";

#[allow(clippy::expect_used)]
static MOUNT_HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{0,62}$").expect("valid regex"));

/// Rejects hostnames that are empty or unsafe to interpolate into mount
/// commands.
///
/// # Errors
///
/// `SERVICE_REQUIRED` for an empty hostname, `INVALID_HOSTNAME` otherwise.
pub fn validate_mount_hostname(hostname: &str) -> Result<(), ZcpError> {
    if hostname.is_empty() {
        return Err(ZcpError::new(
            ErrorCode::ServiceRequired,
            "Service hostname is required",
            "Provide the service hostname",
        ));
    }
    if !MOUNT_HOSTNAME_RE.is_match(hostname) {
        return Err(ZcpError::new(
            ErrorCode::InvalidHostname,
            format!("Invalid hostname format: {hostname}"),
            "Hostname must start with a letter and contain only letters, digits, hyphens, underscores (max 63 chars)",
        ));
    }
    Ok(())
}

/// `/var/www/<hostname>`.
#[must_use]
pub fn mount_path(hostname: &str) -> String {
    format!("{MOUNT_BASE}/{hostname}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MountStatus {
    Mounted,
    AlreadyMounted,
    Unmounted,
    NotMounted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountResult {
    pub status: MountStatus,
    pub hostname: String,
    pub mount_path: String,
    pub writable: bool,
    pub message: String,
}

impl MountResult {
    #[must_use]
    pub fn new(status: MountStatus, hostname: &str, writable: bool) -> Self {
        let path = mount_path(hostname);
        let message = match status {
            MountStatus::Mounted => format!("Mounted {hostname} at {path}"),
            MountStatus::AlreadyMounted => {
                format!("Service {hostname} is already mounted at {path}")
            }
            MountStatus::Unmounted => format!("Unmounted {hostname} from {path}"),
            MountStatus::NotMounted => format!("Service {hostname} is not mounted"),
        };
        Self {
            status,
            hostname: hostname.to_string(),
            mount_path: path,
            writable,
            message,
        }
    }
}

/// Advisory mount state for one hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountInfo {
    pub hostname: String,
    pub mount_path: String,
    pub mounted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub writable: bool,
}
