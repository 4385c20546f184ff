//! Application service: reading runtime logs of a service.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use zcp_common::{LogEntry, LogFetchParams};

use crate::application::ports::{LogFetcher, PlatformClient};
use crate::application::services::manage::find_service;
use crate::domain::error::{ErrorCode, ZcpError};
use crate::domain::identifiers::parse_since;

pub const DEFAULT_LOG_LIMIT: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct LogsQuery<'a> {
    pub hostname: &'a str,
    pub severity: &'a str,
    /// `30m`, `2h`, `1d`, RFC 3339, or empty for the last hour.
    pub since: &'a str,
    /// `0` means [`DEFAULT_LOG_LIMIT`].
    pub limit: usize,
    pub search: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResult {
    pub entries: Vec<LogEntry>,
    /// The page was full, so older entries may exist.
    pub has_more: bool,
}

/// # Errors
///
/// `INVALID_PARAMETER` for a malformed `since` (checked first), then
/// `SERVICE_NOT_FOUND`, or an error from the platform or log backend.
pub async fn logs(
    client: &impl PlatformClient,
    fetcher: &impl LogFetcher,
    project_id: &str,
    query: &LogsQuery<'_>,
) -> Result<LogsResult> {
    let limit = if query.limit == 0 { DEFAULT_LOG_LIMIT } else { query.limit };
    let since = parse_since(query.since, Utc::now()).map_err(|e| {
        ZcpError::new(
            ErrorCode::InvalidParameter,
            format!("Invalid since value: {e}"),
            "Use formats like 30m, 1h, 7d, or ISO 8601 (RFC3339)",
        )
    })?;

    let svc = find_service(client, project_id, query.hostname).await?;
    let access = client.get_project_log(project_id).await?;
    let entries = fetcher
        .fetch_logs(
            &access,
            &LogFetchParams {
                service_id: svc.id,
                severity: query.severity.to_string(),
                since: Some(since),
                limit,
                search: query.search.to_string(),
            },
        )
        .await?;

    Ok(LogsResult {
        has_more: entries.len() >= limit,
        entries,
    })
}
