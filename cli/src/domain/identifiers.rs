//! Identifier resolution and user-input parsing. No I/O, no async.
//!
//! Hostname resolution always works on a service list the caller fetched
//! for the current operation; nothing here talks to the platform.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use zcp_common::{EnvVar, ServiceStack};

use crate::domain::error::{ErrorCode, ZcpError};

/// `<N>m`, `<N>h` or `<N>d`.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(\d+)(m|h|d)$").expect("valid regex")
});

/// Cross-service env references such as `${db_hostname}`.
pub static CROSS_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}").expect("valid regex")
});

/// Platform-injected env keys hidden from output.
pub const FILTERED_ENV_KEYS: &[&str] = &["zeropsSubdomain"];

// ── Hostname resolution ───────────────────────────────────────────────────────

/// Finds the service whose hostname matches exactly (case-sensitive).
///
/// # Errors
///
/// Returns `SERVICE_NOT_FOUND` listing the available hostnames.
pub fn resolve_service<'a>(
    services: &'a [ServiceStack],
    hostname: &str,
) -> Result<&'a ServiceStack, ZcpError> {
    services.iter().find(|s| s.name == hostname).ok_or_else(|| {
        ZcpError::new(
            ErrorCode::ServiceNotFound,
            format!("Service '{hostname}' not found"),
            format!("Available services: {}", list_hostnames(services)),
        )
    })
}

/// Comma-separated hostnames, or `(none)`.
#[must_use]
pub fn list_hostnames(services: &[ServiceStack]) -> String {
    if services.is_empty() {
        return "(none)".to_string();
    }
    services
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Env pairs ─────────────────────────────────────────────────────────────────

/// A parsed `KEY=value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPair {
    pub key: String,
    pub value: String,
}

/// Splits each `KEY=value` on the first `=`; the value may itself contain `=`.
///
/// # Errors
///
/// Returns `INVALID_ENV_FORMAT` for a missing `=` or an empty key.
pub fn parse_env_pairs<S: AsRef<str>>(vars: &[S]) -> Result<Vec<EnvPair>, ZcpError> {
    vars.iter()
        .map(|raw| {
            let raw = raw.as_ref();
            let Some((key, value)) = raw.split_once('=') else {
                return Err(ZcpError::new(
                    ErrorCode::InvalidEnvFormat,
                    format!("Invalid format '{raw}', expected KEY=value"),
                    "Format: KEY=value (split on first '=')",
                ));
            };
            if key.is_empty() {
                return Err(ZcpError::new(
                    ErrorCode::InvalidEnvFormat,
                    "Empty key in env var",
                    "Format: KEY=value",
                ));
            }
            Ok(EnvPair {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Renders pairs as the newline-delimited env file the platform accepts.
#[must_use]
pub fn env_file_content(pairs: &[EnvPair]) -> String {
    pairs.iter().fold(String::new(), |mut acc, p| {
        acc.push_str(&p.key);
        acc.push('=');
        acc.push_str(&p.value);
        acc.push('\n');
        acc
    })
}

/// Id of the env var with this key, if present.
#[must_use]
pub fn find_env_id<'a>(envs: &'a [EnvVar], key: &str) -> Option<&'a str> {
    envs.iter().find(|e| e.key == key).map(|e| e.id.as_str())
}

// ── Env projection ────────────────────────────────────────────────────────────

/// Env var as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvView {
    pub key: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_reference: bool,
}

/// Drops platform-injected keys and flags cross-service references.
#[must_use]
pub fn project_envs(envs: &[EnvVar]) -> Vec<EnvView> {
    envs.iter()
        .filter(|e| !FILTERED_ENV_KEYS.contains(&e.key.as_str()))
        .map(|e| EnvView {
            key: e.key.clone(),
            value: e.content.clone(),
            is_reference: CROSS_REF_RE.is_match(&e.content),
        })
        .collect()
}

// ── Since ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinceError {
    #[error("minutes must be 1-1440")]
    Minutes,
    #[error("hours must be 1-168")]
    Hours,
    #[error("days must be 1-30")]
    Days,
    #[error("invalid format: {0}")]
    Format(String),
}

/// Parses a log window start relative to `now`.
///
/// Accepts `""` (one hour ago), `Nm` (1..=1440), `Nh` (1..=168),
/// `Nd` (1..=30), or an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns [`SinceError`] for out-of-range counts or unrecognized input.
pub fn parse_since(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, SinceError> {
    if input.is_empty() {
        return Ok(now - Duration::hours(1));
    }

    if let Some(caps) = DURATION_RE.captures(input) {
        // Digits that overflow u32 are out of range for every unit.
        let n: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let n64 = i64::from(n);
        return match &caps[2] {
            "m" if (1..=1440).contains(&n) => Ok(now - Duration::minutes(n64)),
            "m" => Err(SinceError::Minutes),
            "h" if (1..=168).contains(&n) => Ok(now - Duration::hours(n64)),
            "h" => Err(SinceError::Hours),
            "d" if (1..=30).contains(&n) => Ok(now - Duration::days(n64)),
            _ => Err(SinceError::Days),
        };
    }

    DateTime::parse_from_rfc3339(input)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| SinceError::Format(input.to_string()))
}
