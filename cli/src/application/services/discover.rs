//! Application service: project and service discovery.

use anyhow::Result;
use serde::Serialize;
use tracing::warn;
use zcp_common::{CustomAutoscaling, Port, ServiceStack};

use crate::application::ports::PlatformClient;
use crate::domain::identifiers::{EnvView, project_envs, resolve_service};

pub const CROSS_REFERENCE_NOTE: &str = "Values showing ${...} are cross-service references. \
They are resolved inside the running container, not in the API. Do not restart to resolve them.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envs: Option<Vec<EnvView>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Containers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_containers: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_containers: Option<i32>,
}

/// Only the non-zero settings of the applied autoscaling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cpu: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ram: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ram: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_disk: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_disk: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub hostname: String,
    pub service_id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containers: Option<Containers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<Port>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envs: Option<Vec<EnvView>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverResult {
    pub project: ProjectInfo,
    pub services: Vec<ServiceInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

fn non_zero_i32(v: i32) -> Option<i32> {
    (v != 0).then_some(v)
}

#[allow(clippy::float_cmp)]
fn non_zero_f64(v: f64) -> Option<f64> {
    (v != 0.0).then_some(v)
}

fn summary_info(svc: &ServiceStack) -> ServiceInfo {
    ServiceInfo {
        hostname: svc.name.clone(),
        service_id: svc.id.clone(),
        type_name: svc.type_info.version_name.clone(),
        status: svc.status.clone(),
        created: None,
        containers: None,
        resources: None,
        ports: None,
        envs: None,
    }
}

fn resources_of(a: &CustomAutoscaling) -> Option<Resources> {
    let r = Resources {
        cpu_mode: (!a.cpu_mode.is_empty()).then(|| a.cpu_mode.clone()),
        min_cpu: non_zero_i32(a.min_cpu),
        max_cpu: non_zero_i32(a.max_cpu),
        min_ram: non_zero_f64(a.min_ram),
        max_ram: non_zero_f64(a.max_ram),
        min_disk: non_zero_f64(a.min_disk),
        max_disk: non_zero_f64(a.max_disk),
    };
    (r != Resources::default()).then_some(r)
}

fn containers_of(a: &CustomAutoscaling) -> Option<Containers> {
    let c = Containers {
        min_containers: non_zero_i32(a.horizontal_min_count),
        max_containers: non_zero_i32(a.horizontal_max_count),
    };
    (c != Containers::default()).then_some(c)
}

/// Summary plus creation time, autoscaling and ports.
#[must_use]
pub fn detailed_info(svc: &ServiceStack) -> ServiceInfo {
    let mut info = summary_info(svc);
    info.created = Some(svc.created.clone());
    if let Some(a) = &svc.custom_autoscaling {
        info.resources = resources_of(a);
        info.containers = containers_of(a);
    }
    if !svc.ports.is_empty() {
        info.ports = Some(svc.ports.clone());
    }
    info
}

async fn attach_service_envs(client: &impl PlatformClient, info: &mut ServiceInfo) {
    match client.get_service_env(&info.service_id).await {
        Ok(envs) => info.envs = Some(project_envs(&envs)),
        Err(e) => warn!(service = %info.hostname, error = %e, "service env fetch failed"),
    }
}

fn has_cross_references(services: &[ServiceInfo]) -> bool {
    services
        .iter()
        .filter_map(|s| s.envs.as_deref())
        .flatten()
        .any(|e| e.is_reference)
}

/// Describes the project, or a single service in detail when `hostname` is
/// given.
///
/// Env fetch failures leave the corresponding `envs` absent. Project-level
/// envs are attached only for the whole-project listing.
///
/// # Errors
///
/// Fails if the project or service list cannot be fetched, or with
/// `SERVICE_NOT_FOUND` for an unknown hostname.
pub async fn discover(
    client: &impl PlatformClient,
    project_id: &str,
    hostname: Option<&str>,
    include_envs: bool,
) -> Result<DiscoverResult> {
    let project = client.get_project(project_id).await?;
    let services = client.list_services(project_id).await?;

    let mut result = DiscoverResult {
        project: ProjectInfo {
            id: project.id,
            name: project.name,
            status: project.status,
            envs: None,
        },
        services: Vec::new(),
        notes: Vec::new(),
    };

    if let Some(hostname) = hostname.filter(|h| !h.is_empty()) {
        let svc = resolve_service(&services, hostname)?;
        let mut info = detailed_info(svc);
        if include_envs {
            attach_service_envs(client, &mut info).await;
        }
        result.services.push(info);
    } else {
        for svc in services.iter().filter(|s| !s.is_system()) {
            let mut info = summary_info(svc);
            if include_envs {
                attach_service_envs(client, &mut info).await;
            }
            result.services.push(info);
        }
        if include_envs {
            match client.get_project_env(project_id).await {
                Ok(envs) => result.project.envs = Some(project_envs(&envs)),
                Err(e) => warn!(error = %e, "project env fetch failed"),
            }
        }
    }

    if has_cross_references(&result.services) {
        result.notes.push(CROSS_REFERENCE_NOTE.to_string());
    }
    Ok(result)
}
