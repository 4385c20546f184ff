//! Application service: project and service environment variables.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;
use zcp_common::Process;

use crate::application::ports::PlatformClient;
use crate::application::services::manage::find_service;
use crate::domain::error::{ErrorCode, ZcpError};
use crate::domain::identifiers::{EnvView, env_file_content, find_env_id, parse_env_pairs, project_envs};

/// Where an env operation applies. Project scope wins when both are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvScope<'a> {
    Project,
    Service(&'a str),
}

impl<'a> EnvScope<'a> {
    /// # Errors
    ///
    /// `INVALID_USAGE` when neither a hostname nor project scope is given.
    pub fn from_args(hostname: Option<&'a str>, project: bool) -> Result<Self, ZcpError> {
        if project {
            return Ok(Self::Project);
        }
        match hostname.filter(|h| !h.is_empty()) {
            Some(h) => Ok(Self::Service(h)),
            None => Err(ZcpError::new(
                ErrorCode::InvalidUsage,
                "Provide serviceHostname or set project=true",
                "Specify which scope the env vars belong to",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvGetResult {
    /// `project` or `service`.
    pub scope: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_hostname: Option<String>,
    pub vars: Vec<EnvView>,
}

/// Result of a set or delete: the last process submitted, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvChangeResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
}

/// Reads env vars of the project or of one service.
///
/// # Errors
///
/// `SERVICE_NOT_FOUND`, or the platform error.
pub async fn env_get(
    client: &impl PlatformClient,
    project_id: &str,
    scope: EnvScope<'_>,
) -> Result<EnvGetResult> {
    match scope {
        EnvScope::Project => {
            let envs = client.get_project_env(project_id).await?;
            Ok(EnvGetResult {
                scope: "project",
                service_hostname: None,
                vars: project_envs(&envs),
            })
        }
        EnvScope::Service(hostname) => {
            let svc = find_service(client, project_id, hostname).await?;
            let envs = client.get_service_env(&svc.id).await?;
            Ok(EnvGetResult {
                scope: "service",
                service_hostname: Some(hostname.to_string()),
                vars: project_envs(&envs),
            })
        }
    }
}

/// Sets `KEY=value` pairs.
///
/// Project scope submits one request per pair; service scope replaces the
/// service's env file in a single request.
///
/// # Errors
///
/// `INVALID_ENV_FORMAT` before any platform call, then `SERVICE_NOT_FOUND`
/// or the first platform error.
pub async fn env_set<S: AsRef<str>>(
    client: &impl PlatformClient,
    project_id: &str,
    scope: EnvScope<'_>,
    variables: &[S],
) -> Result<EnvChangeResult> {
    let pairs = parse_env_pairs(variables)?;
    match scope {
        EnvScope::Project => {
            let mut last = None;
            for pair in &pairs {
                debug!(key = %pair.key, "setting project env");
                last = Some(
                    client
                        .create_project_env(project_id, &pair.key, &pair.value)
                        .await?,
                );
            }
            Ok(EnvChangeResult { process: last })
        }
        EnvScope::Service(hostname) => {
            let svc = find_service(client, project_id, hostname).await?;
            let process = client
                .set_service_env_file(&svc.id, &env_file_content(&pairs))
                .await?;
            Ok(EnvChangeResult {
                process: Some(process),
            })
        }
    }
}

fn key_not_found(key: &str) -> ZcpError {
    ZcpError::new(
        ErrorCode::InvalidParameter,
        format!("Environment variable '{key}' not found"),
        "List the current variables with env get",
    )
}

/// Deletes variables by key, one request each.
///
/// # Errors
///
/// `INVALID_PARAMETER` for a key that does not exist (variables before it
/// are already deleted), `SERVICE_NOT_FOUND`, or the platform error.
pub async fn env_delete<S: AsRef<str>>(
    client: &impl PlatformClient,
    project_id: &str,
    scope: EnvScope<'_>,
    keys: &[S],
) -> Result<EnvChangeResult> {
    let mut last = None;
    match scope {
        EnvScope::Project => {
            let envs = client.get_project_env(project_id).await?;
            for key in keys {
                let key = key.as_ref();
                let id = find_env_id(&envs, key).ok_or_else(|| key_not_found(key))?;
                last = Some(client.delete_project_env(id).await?);
            }
        }
        EnvScope::Service(hostname) => {
            let svc = find_service(client, project_id, hostname).await?;
            let envs = client.get_service_env(&svc.id).await?;
            for key in keys {
                let key = key.as_ref();
                let id = find_env_id(&envs, key).ok_or_else(|| key_not_found(key))?;
                last = Some(client.delete_user_data(id).await?);
            }
        }
    }
    Ok(EnvChangeResult { process: last })
}
