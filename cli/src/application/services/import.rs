//! Application service: importing services from an `import.yml`.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use zcp_common::{ImportResult, ProcessStatus};

use crate::application::ports::{LocalFs, PlatformClient};
use crate::application::services::catalog_cache::CatalogCache;
use crate::application::services::validate::resolve_input;
use crate::domain::catalog::{ImportService, validate_service_types};
use crate::domain::error::{Canceled, ErrorCode, ZcpError};
use crate::domain::validate::parse_import_manifest;

/// Interval between checks for services still being deleted.
pub const DELETING_POLL_INTERVAL: Duration = Duration::from_secs(3);

const DELETING_STATUS: &str = "DELETING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProcess {
    pub process_id: String,
    pub action_name: String,
    pub status: ProcessStatus,
    pub service: String,
    pub service_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutput {
    pub project_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    /// Services that would be created; dry runs only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ImportService>,
    pub processes: Vec<ImportProcess>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub struct ImportRequest<'a> {
    pub content: Option<&'a str>,
    pub file_path: Option<&'a str>,
    pub dry_run: bool,
    /// Upper bound for waiting on services in `DELETING`.
    pub deleting_timeout: Duration,
}

/// Flattens per-service processes; per-service rejections become warnings.
#[must_use]
pub fn flatten_import(result: &ImportResult) -> (Vec<ImportProcess>, Vec<String>) {
    let mut processes = Vec::new();
    let mut warnings = Vec::new();
    for stack in &result.service_stacks {
        if let Some(err) = &stack.error {
            warnings.push(format!("service \"{}\": {}: {}", stack.name, err.code, err.message));
        }
        processes.extend(stack.processes.iter().map(|p| ImportProcess {
            process_id: p.id.clone(),
            action_name: p.action_name.clone(),
            status: p.status,
            service: stack.name.clone(),
            service_id: stack.id.clone(),
            fail_reason: p.fail_reason.clone(),
        }));
    }
    (processes, warnings)
}

/// Waits until none of `hostnames` is `DELETING` in the project.
///
/// # Errors
///
/// `API_TIMEOUT` after `timeout`, [`Canceled`], or a failed listing.
pub async fn wait_for_deleting(
    client: &impl PlatformClient,
    project_id: &str,
    hostnames: &HashSet<&str>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    if hostnames.is_empty() {
        return Ok(());
    }
    let start = Instant::now();
    loop {
        if cancel.is_cancelled() {
            return Err(Canceled.into());
        }
        let services = client.list_services(project_id).await?;
        let conflicts: Vec<&str> = services
            .iter()
            .filter(|s| s.status == DELETING_STATUS && hostnames.contains(s.name.as_str()))
            .map(|s| s.name.as_str())
            .collect();
        if conflicts.is_empty() {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(ZcpError::new(
                ErrorCode::ApiTimeout,
                format!(
                    "timed out waiting for DELETING services to finish: [{}]",
                    conflicts.join(", ")
                ),
                "Services are still being deleted. Wait and retry, or use a different hostname.",
            )
            .into());
        }
        debug!(?conflicts, "waiting for services to finish deleting");
        tokio::select! {
            () = cancel.cancelled() => return Err(Canceled.into()),
            () = sleep(DELETING_POLL_INTERVAL) => {}
        }
    }
}

/// Imports services into an existing project, or previews them with
/// `dry_run`.
///
/// The manifest is parsed first: a `project:` section is rejected and a
/// `services:` list is required. With a catalog, unknown types and managed
/// types without `mode` produce warnings. A real import first waits for
/// same-named services that are still being deleted.
///
/// # Errors
///
/// Input and manifest errors before any platform call, then `API_TIMEOUT`,
/// [`Canceled`] or the platform error.
pub async fn import(
    client: &impl PlatformClient,
    fs: &impl LocalFs,
    catalog: Option<&CatalogCache>,
    project_id: &str,
    request: &ImportRequest<'_>,
    cancel: &CancellationToken,
) -> Result<ImportOutput> {
    let yaml = resolve_input(fs, request.content, request.file_path)?;
    let services = parse_import_manifest(&yaml)?;

    let mut warnings = match catalog {
        Some(cache) => validate_service_types(&services, &cache.get(client).await),
        None => Vec::new(),
    };

    if request.dry_run {
        return Ok(ImportOutput {
            project_id: project_id.to_string(),
            project_name: String::new(),
            dry_run: true,
            services,
            processes: Vec::new(),
            warnings,
        });
    }

    let hostnames: HashSet<&str> = services
        .iter()
        .map(|s| s.hostname.as_str())
        .filter(|h| !h.is_empty())
        .collect();
    wait_for_deleting(client, project_id, &hostnames, request.deleting_timeout, cancel).await?;

    let result = client.import_services(project_id, &yaml).await?;
    let (processes, rejected) = flatten_import(&result);
    warnings.extend(rejected);
    info!(project_id, processes = processes.len(), "import submitted");

    Ok(ImportOutput {
        project_id: result.project_id,
        project_name: result.project_name,
        dry_run: false,
        services: Vec::new(),
        processes,
        warnings,
    })
}
