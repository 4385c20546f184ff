//! Merging processes and app versions into one activity timeline.
//!
//! Pure: the fetches happen in `application::services::events`.

use std::collections::HashMap;

use chrono::{DateTime, Duration};
use serde::Serialize;
use zcp_common::{AppVersionEvent, Process, ServiceStack};

/// Default number of events returned.
pub const DEFAULT_EVENTS_LIMIT: usize = 50;

const ACTION_NAMES: &[(&str, &str)] = &[
    ("serviceStackStart", "start"),
    ("serviceStackStop", "stop"),
    ("serviceStackRestart", "restart"),
    ("serviceStackAutoscaling", "scale"),
    ("serviceStackImport", "import"),
    ("serviceStackDelete", "delete"),
    ("serviceStackUserDataFile", "env-update"),
    ("serviceStackEnableSubdomainAccess", "subdomain-enable"),
    ("serviceStackDisableSubdomainAccess", "subdomain-disable"),
];

const PROCESS_HINTS: &[(&str, &str)] = &[
    ("FINISHED", "COMPLETE: Process finished successfully."),
    ("RUNNING", "IN_PROGRESS: Process still running."),
    ("FAILED", "FAILED: Process failed."),
    ("PENDING", "IN_PROGRESS: Process queued."),
];

const APP_VERSION_HINTS: &[(&str, &str)] = &[
    (
        "ACTIVE",
        "DEPLOYED: App version is deployed and running. Build pipeline complete. No further polling needed.",
    ),
    ("BUILDING", "IN_PROGRESS: Build is running. Continue polling."),
    (
        "BUILD_FAILED",
        "FAILED: Build failed. Check build logs with zerops_logs severity=error.",
    ),
    ("DEPLOYING", "IN_PROGRESS: Deploy is running. Continue polling."),
];

// ── Types ─────────────────────────────────────────────────────────────────────

/// Kind of timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Process,
    Build,
    Deploy,
}

impl EventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Build => "build",
            Self::Deploy => "deploy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub action: String,
    pub status: String,
    pub service: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub process_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventsSummary {
    pub total: usize,
    pub processes: usize,
    /// Builds and deploys.
    pub deploys: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResult {
    pub project_id: String,
    pub events: Vec<TimelineEvent>,
    pub summary: EventsSummary,
}

// ── Mapping ───────────────────────────────────────────────────────────────────

/// Normalizes a platform action name; unknown names pass through unchanged.
#[must_use]
pub fn map_action_name(name: &str) -> &str {
    ACTION_NAMES
        .iter()
        .find(|(raw, _)| *raw == name)
        .map_or(name, |&(_, mapped)| mapped)
}

fn lookup_hint(status: &str, hints: &[(&str, &'static str)]) -> &'static str {
    let upper = status.to_ascii_uppercase();
    hints
        .iter()
        .find(|(key, _)| *key == upper)
        .map_or("", |&(_, hint)| hint)
}

/// Interpretation hint for a process status (case-insensitive).
#[must_use]
pub fn process_hint(status: &str) -> &'static str {
    lookup_hint(status, PROCESS_HINTS)
}

/// Interpretation hint for an app-version status (case-insensitive).
#[must_use]
pub fn app_version_hint(status: &str) -> &'static str {
    lookup_hint(status, APP_VERSION_HINTS)
}

/// `"45s"`, `"3m"`, `"3m12s"`, `"2h"`, `"2h5m"`. Negative durations render empty.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    if d < Duration::zero() {
        return String::new();
    }
    let secs = d.num_seconds();
    if secs < 60 {
        return format!("{secs}s");
    }
    if secs < 3600 {
        let (m, s) = (secs / 60, secs % 60);
        return if s > 0 { format!("{m}m{s}s") } else { format!("{m}m") };
    }
    let (h, m) = (secs / 3600, (secs / 60) % 60);
    if m > 0 { format!("{h}h{m}m") } else { format!("{h}h") }
}

/// Formatted duration between two RFC 3339 timestamps, empty when either is
/// missing or unparsable.
#[must_use]
pub fn duration_between(start: Option<&str>, end: Option<&str>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    match (
        DateTime::parse_from_rfc3339(start),
        DateTime::parse_from_rfc3339(end),
    ) {
        (Ok(s), Ok(e)) => format_duration(e - s),
        _ => String::new(),
    }
}

fn process_event(p: &Process, names: &HashMap<&str, &str>) -> TimelineEvent {
    let service = p
        .service_stacks
        .first()
        .map(|r| {
            names
                .get(r.id.as_str())
                .map_or_else(|| r.name.clone(), |n| (*n).to_string())
        })
        .unwrap_or_default();

    TimelineEvent {
        timestamp: p.created.clone(),
        event_type: EventType::Process,
        action: map_action_name(&p.action_name).to_string(),
        status: p.status.as_str().to_string(),
        service,
        duration: duration_between(p.started.as_deref(), p.finished.as_deref()),
        user: p
            .created_by_user
            .as_ref()
            .map(|u| u.full_name.clone())
            .unwrap_or_default(),
        process_id: p.id.clone(),
        hint: process_hint(p.status.as_str()).to_string(),
    }
}

fn app_version_event(av: &AppVersionEvent, names: &HashMap<&str, &str>) -> TimelineEvent {
    let event_type = if av.has_pipeline_start() {
        EventType::Build
    } else {
        EventType::Deploy
    };
    TimelineEvent {
        timestamp: av.created.clone(),
        event_type,
        action: event_type.as_str().to_string(),
        status: av.status.clone(),
        service: names
            .get(av.service_stack_id.as_str())
            .map(|n| (*n).to_string())
            .unwrap_or_default(),
        duration: String::new(),
        user: String::new(),
        process_id: String::new(),
        hint: app_version_hint(&av.status).to_string(),
    }
}

/// Merges, filters, orders newest-first and trims to `limit`.
///
/// Ordering is a stable sort on the RFC 3339 timestamp strings, so equal
/// timestamps keep fetch order: processes before app versions.
#[must_use]
pub fn build_timeline(
    project_id: &str,
    processes: &[Process],
    app_versions: &[AppVersionEvent],
    services: &[ServiceStack],
    service_hostname: &str,
    limit: usize,
) -> EventsResult {
    let limit = if limit == 0 { DEFAULT_EVENTS_LIMIT } else { limit };
    let names: HashMap<&str, &str> = services
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();

    let mut events: Vec<TimelineEvent> = processes
        .iter()
        .map(|p| process_event(p, &names))
        .chain(app_versions.iter().map(|av| app_version_event(av, &names)))
        .filter(|e| service_hostname.is_empty() || e.service == service_hostname)
        .collect();

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events.truncate(limit);

    let processes = events
        .iter()
        .filter(|e| e.event_type == EventType::Process)
        .count();
    let summary = EventsSummary {
        total: events.len(),
        processes,
        deploys: events.len() - processes,
    };

    EventsResult {
        project_id: project_id.to_string(),
        events,
        summary,
    }
}
