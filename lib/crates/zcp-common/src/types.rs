use serde::{Deserialize, Serialize};

use crate::events::UserRef;

/// Service categories that belong to the platform itself and are hidden
/// from user-facing listings.
pub const SYSTEM_CATEGORIES: &[&str] = &[
    "CORE",
    "BUILD",
    "INTERNAL",
    "PREPARE_RUNTIME",
    "HTTP_L7_BALANCER",
];

/// A platform project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Public subdomain host, e.g. `"1df2.prg1.zerops.app"`. Empty when the
    /// project has no subdomain routing configured.
    #[serde(default)]
    pub subdomain_host: String,
}

/// A service stack. `name` is the hostname.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStack {
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(rename = "serviceStackTypeInfo")]
    pub type_info: ServiceTypeInfo,
    pub status: String,
    /// `HA` or `NON_HA`.
    #[serde(default)]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_autoscaling: Option<CustomAutoscaling>,
    #[serde(default)]
    pub subdomain_access: bool,
    pub created: String,
}

impl ServiceStack {
    /// Returns `true` if the service belongs to a platform-internal category.
    #[must_use]
    pub fn is_system(&self) -> bool {
        SYSTEM_CATEGORIES.contains(&self.type_info.category_name.as_str())
    }
}

/// Type details attached to a service stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceTypeInfo {
    /// e.g. `"nodejs@22"`
    #[serde(rename = "serviceStackTypeVersionName")]
    pub version_name: String,
    /// e.g. `"USER"`, `"STANDARD"`, `"CORE"`
    #[serde(rename = "serviceStackTypeCategoryName")]
    pub category_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Port {
    pub port: u16,
    pub protocol: String,
    pub public: bool,
}

/// Vertical and horizontal scaling currently applied to a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomAutoscaling {
    pub horizontal_min_count: i32,
    pub horizontal_max_count: i32,
    /// `SHARED` or `DEDICATED`.
    pub cpu_mode: String,
    pub start_cpu_core_count: i32,
    pub min_cpu: i32,
    pub max_cpu: i32,
    pub min_ram: f64,
    pub max_ram: f64,
    pub min_disk: f64,
    pub max_disk: f64,
}

/// Autoscaling request. Only `Some` fields are sent to the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingParams {
    /// Current `HA`/`NON_HA` mode. The platform rejects requests that would
    /// change it, so it is always echoed back.
    pub service_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_min_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_max_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_cpu_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_start_cpu: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_min_cpu: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_max_cpu: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_min_ram: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_max_ram: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_min_disk: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_max_disk: Option<f64>,
}

/// Lifecycle state of an asynchronous platform process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    Pending,
    Running,
    Finished,
    Failed,
    Canceled,
}

impl ProcessStatus {
    /// Terminal states never change again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Canceled)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asynchronous platform operation.
///
/// Also used for activity search results, where `created_by_user` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    pub action_name: String,
    pub status: ProcessStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_stacks: Vec<ServiceStackRef>,
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_user: Option<UserRef>,
}

/// Lightweight service reference embedded in processes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceStackRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvVar {
    pub id: String,
    pub key: String,
    pub content: String,
}

/// Outcome of an infrastructure import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub project_id: String,
    pub project_name: String,
    pub service_stacks: Vec<ImportedServiceStack>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportedServiceStack {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processes: Vec<Process>,
    /// Per-service rejection reported by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PlatformErrorInfo>,
}

/// Error payload the platform attaches to partially failed requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformErrorInfo {
    pub code: String,
    pub message: String,
}
