use serde::{Deserialize, Serialize};

/// App-version statuses after which a build pipeline no longer changes.
pub const BUILD_TERMINAL_STATUSES: &[&str] = &["ACTIVE", "BUILD_FAILED"];

/// Returns `true` for app-version statuses that end a build pipeline.
#[must_use]
pub fn is_build_terminal(status: &str) -> bool {
    BUILD_TERMINAL_STATUSES.contains(&status)
}

/// A build/deploy pipeline execution for one service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionEvent {
    pub id: String,
    pub project_id: String,
    pub service_stack_id: String,
    #[serde(default)]
    pub source: String,
    /// `BUILDING`, `DEPLOYING`, `ACTIVE`, `BUILD_FAILED`, ...
    pub status: String,
    /// Monotonic per service.
    pub sequence: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildInfo>,
    pub created: String,
    #[serde(default)]
    pub last_update: String,
}

impl AppVersionEvent {
    /// A pipeline start marks a full build, otherwise a plain deploy.
    #[must_use]
    pub fn has_pipeline_start(&self) -> bool {
        self.build
            .as_ref()
            .is_some_and(|b| b.pipeline_start.is_some())
    }
}

/// Build pipeline timing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_finish: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_failed: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}
