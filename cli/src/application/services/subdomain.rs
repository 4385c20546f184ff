//! Application service: public subdomain access.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;
use zcp_common::{Port, Process, ServiceStack};

use crate::application::ports::PlatformClient;
use crate::domain::error::{ApiError, ErrorCode, ZcpError};
use crate::domain::identifiers::resolve_service;
use crate::domain::subdomain::{SubdomainAction, parse_subdomain_domain, subdomain_urls};

pub const ALREADY_ENABLED_CODE: &str = "SUBDOMAIN_ALREADY_ENABLED";
pub const ALREADY_DISABLED_CODE: &str = "SUBDOMAIN_ALREADY_DISABLED";

/// Env var in which the platform publishes a service's subdomain URL.
const SUBDOMAIN_ENV_KEY: &str = "zeropsSubdomain";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdomainResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    pub service_hostname: String,
    pub service_id: String,
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subdomain_urls: Vec<String>,
}

fn has_api_code(err: &anyhow::Error, code: &str) -> bool {
    err.downcast_ref::<ApiError>().is_some_and(|e| e.code == code)
}

/// Domain taken from the service's `zeropsSubdomain` env var, if any.
async fn env_domain(client: &impl PlatformClient, service_id: &str) -> Option<String> {
    let envs = client.get_service_env(service_id).await.ok()?;
    envs.iter()
        .find(|e| e.key == SUBDOMAIN_ENV_KEY)
        .and_then(|e| parse_subdomain_domain(&e.content))
        .map(str::to_string)
}

/// Subdomain URLs of `svc` on `ports`.
///
/// The project's subdomain host is tried first; the env-published domain
/// is only fetched when that host has no domain part. Lookup failures give
/// an empty list.
pub async fn resolve_subdomain_urls(
    client: &impl PlatformClient,
    project_id: &str,
    svc: &ServiceStack,
    ports: &[Port],
) -> Vec<String> {
    if ports.is_empty() {
        return Vec::new();
    }
    let Ok(project) = client.get_project(project_id).await else {
        return Vec::new();
    };
    let host = project.subdomain_host;
    if host.is_empty() {
        return Vec::new();
    }
    let direct = subdomain_urls(&svc.name, &host, ports, None);
    if !direct.is_empty() {
        return direct;
    }
    let domain = env_domain(client, &svc.id).await;
    debug!(service = %svc.name, ?domain, "subdomain host without domain, using env");
    subdomain_urls(&svc.name, &host, ports, domain.as_deref())
}

/// Enables or disables the service's public subdomain.
///
/// Already being in the requested state is a success with status
/// `already_enabled` / `already_disabled`. On enable the result lists the
/// service's URLs.
///
/// # Errors
///
/// `INVALID_PARAMETER` for an unknown action, `SERVICE_NOT_FOUND`, or any
/// other platform error.
pub async fn subdomain(
    client: &impl PlatformClient,
    project_id: &str,
    hostname: &str,
    action: &str,
) -> Result<SubdomainResult> {
    let Some(action) = SubdomainAction::parse(action) else {
        return Err(ZcpError::new(
            ErrorCode::InvalidParameter,
            "action must be 'enable' or 'disable'",
            "Use action='enable' or action='disable'",
        )
        .into());
    };

    let services = client.list_services(project_id).await?;
    let svc = resolve_service(&services, hostname)?;
    let mut result = SubdomainResult {
        process: None,
        service_hostname: hostname.to_string(),
        service_id: svc.id.clone(),
        action: action.as_str().to_string(),
        status: String::new(),
        subdomain_urls: Vec::new(),
    };

    match action {
        SubdomainAction::Enable => {
            match client.enable_subdomain_access(&svc.id).await {
                Ok(process) => result.process = Some(process),
                Err(e) if has_api_code(&e, ALREADY_ENABLED_CODE) => {
                    result.status = "already_enabled".to_string();
                }
                Err(e) => return Err(e),
            }
            result.subdomain_urls = resolve_subdomain_urls(client, project_id, svc, &svc.ports).await;
        }
        SubdomainAction::Disable => match client.disable_subdomain_access(&svc.id).await {
            Ok(process) => result.process = Some(process),
            Err(e) if has_api_code(&e, ALREADY_DISABLED_CODE) => {
                result.status = "already_disabled".to_string();
            }
            Err(e) => return Err(e),
        },
    }
    Ok(result)
}
