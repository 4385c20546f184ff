//! Health-check results and their aggregation.
//!
//! The checks themselves run in `application::services::verify`; this module
//! classifies services, interprets HTTP responses and folds check results
//! into one status.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::catalog::base_name;

/// Base type names operated by the platform. Only liveness is checked.
pub const MANAGED_BASE_TYPES: &[&str] = &[
    "postgresql",
    "mariadb",
    "valkey",
    "keydb",
    "elasticsearch",
    "object-storage",
    "shared-storage",
    "kafka",
    "nats",
    "meilisearch",
    "clickhouse",
    "qdrant",
    "typesense",
    "rabbitmq",
];

/// Maximum response excerpt carried in a check detail.
pub const BODY_EXCERPT_LIMIT: usize = 200;

pub const CHECK_SERVICE_RUNNING: &str = "service_running";
pub const CHECK_NO_ERROR_LOGS: &str = "no_error_logs";
pub const CHECK_STARTUP_DETECTED: &str = "startup_detected";
pub const CHECK_NO_RECENT_ERRORS: &str = "no_recent_errors";
pub const CHECK_HTTP_HEALTH: &str = "http_health";
pub const CHECK_HTTP_STATUS: &str = "http_status";

/// Checks that follow `service_running` for runtime services, in order.
pub const RUNTIME_FOLLOW_UP_CHECKS: &[&str] = &[
    CHECK_NO_ERROR_LOGS,
    CHECK_STARTUP_DETECTED,
    CHECK_NO_RECENT_ERRORS,
    CHECK_HTTP_HEALTH,
    CHECK_HTTP_STATUS,
];

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Runtime,
    Managed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl CheckResult {
    #[must_use]
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            detail: String::new(),
        }
    }

    pub fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            detail: detail.into(),
        }
    }

    pub fn skip(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Skip,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyResult {
    pub hostname: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub status: HealthStatus,
    pub checks: Vec<CheckResult>,
}

// ── Classification ────────────────────────────────────────────────────────────

/// Managed iff the base name (before `@`) is a platform-operated type.
#[must_use]
pub fn classify_service(type_version: &str) -> ServiceKind {
    if MANAGED_BASE_TYPES.contains(&base_name(type_version)) {
        ServiceKind::Managed
    } else {
        ServiceKind::Runtime
    }
}

#[must_use]
pub fn check_service_running(status: &str) -> CheckResult {
    if matches!(status, "RUNNING" | "ACTIVE") {
        CheckResult::pass(CHECK_SERVICE_RUNNING)
    } else {
        CheckResult::fail(CHECK_SERVICE_RUNNING, format!("service status: {status}"))
    }
}

/// `service_running=fail` is unhealthy, any other fail is degraded, skips
/// never downgrade.
#[must_use]
pub fn aggregate_status(checks: &[CheckResult]) -> HealthStatus {
    let failed = |c: &&CheckResult| c.status == CheckStatus::Fail;
    if checks
        .iter()
        .filter(failed)
        .any(|c| c.name == CHECK_SERVICE_RUNNING)
    {
        HealthStatus::Unhealthy
    } else if checks.iter().any(|c| failed(&c)) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

// ── HTTP interpretation ───────────────────────────────────────────────────────

/// Body as text, cut at `limit` bytes (on a char boundary) with `...`.
#[must_use]
pub fn truncate_body(body: &[u8], limit: usize) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= limit {
        return text.into_owned();
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}

fn http_failure_detail(code: u16, body: &[u8]) -> String {
    if body.is_empty() {
        format!("HTTP {code}")
    } else {
        format!("HTTP {code}: {}", truncate_body(body, BODY_EXCERPT_LIMIT))
    }
}

fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// `/health` passes on any 2xx.
#[must_use]
pub fn evaluate_health_response(code: u16, body: &[u8]) -> CheckResult {
    if is_success(code) {
        CheckResult::pass(CHECK_HTTP_HEALTH)
    } else {
        CheckResult::fail(CHECK_HTTP_HEALTH, http_failure_detail(code, body))
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    connections: BTreeMap<String, ConnectionStatus>,
}

#[derive(Debug, Deserialize)]
struct ConnectionStatus {
    #[serde(default)]
    status: String,
}

/// `/status` must be 2xx JSON. With connections, each must report `ok`;
/// otherwise the top-level status must be `ok`.
#[must_use]
pub fn evaluate_status_response(code: u16, body: &[u8]) -> CheckResult {
    if !is_success(code) {
        return CheckResult::fail(CHECK_HTTP_STATUS, http_failure_detail(code, body));
    }
    let Ok(parsed) = serde_json::from_slice::<StatusBody>(body) else {
        return CheckResult::fail(
            CHECK_HTTP_STATUS,
            format!(
                "response not JSON (HTTP {code}): {}",
                truncate_body(body, BODY_EXCERPT_LIMIT)
            ),
        );
    };

    if !parsed.connections.is_empty() {
        return match parsed.connections.iter().find(|(_, c)| c.status != "ok") {
            Some((name, conn)) => CheckResult::fail(
                CHECK_HTTP_STATUS,
                format!("connection '{name}': {}", conn.status),
            ),
            None => CheckResult::pass(CHECK_HTTP_STATUS),
        };
    }
    if parsed.status == "ok" {
        CheckResult::pass(CHECK_HTTP_STATUS)
    } else {
        CheckResult::fail(CHECK_HTTP_STATUS, format!("status: {}", parsed.status))
    }
}
