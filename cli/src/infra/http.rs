//! HTTP adapters: the project log backend and health probes.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;
use zcp_common::{LogAccess, LogEntry, LogFetchParams};

use crate::application::ports::{HttpProbe, HttpResponse, LogFetcher};
use crate::domain::error::{ErrorCode, ZcpError};

/// Request timeout for the log backend.
pub const LOG_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_TAIL: usize = 100;

/// Turns the platform's log URL (`"GET host/path?..."`) into a request URL
/// carrying the query of `params`.
///
/// # Errors
///
/// Returns an error when the URL does not parse.
pub fn log_request_url(access: &LogAccess, params: &LogFetchParams) -> Result<Url> {
    let raw = access.url.trim_start_matches("GET ").trim();
    let raw = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let mut url = Url::parse(&raw).with_context(|| format!("invalid log URL: {raw}"))?;

    {
        let mut query = url.query_pairs_mut();
        if !params.service_id.is_empty() {
            query.append_pair("serviceStackId", &params.service_id);
        }
        let tail = if params.limit == 0 { DEFAULT_TAIL } else { params.limit };
        query.append_pair("tail", &tail.to_string());
        if let Some(since) = params.since {
            query.append_pair(
                "since",
                &since.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            );
        }
        if !params.severity.is_empty() && params.severity != "all" {
            query.append_pair("severity", &params.severity);
        }
        if !params.search.is_empty() {
            query.append_pair("search", &params.search);
        }
    }
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct LogPage {
    #[serde(default)]
    items: Vec<LogItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    severity_label: String,
}

/// Parses a log backend page, oldest first, keeping the newest `limit`
/// entries (`0` keeps all).
///
/// # Errors
///
/// Returns an error for a body that is not a log page.
pub fn parse_log_page(body: &str, limit: usize) -> Result<Vec<LogEntry>> {
    let page: LogPage = serde_json::from_str(body).context("invalid log response")?;
    let mut entries: Vec<LogEntry> = page
        .items
        .into_iter()
        .map(|item| LogEntry {
            id: item.id,
            timestamp: item.timestamp,
            severity: item.severity_label,
            message: item.message,
            container: item.hostname,
        })
        .collect();
    entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    if limit > 0 && entries.len() > limit {
        entries.drain(..entries.len() - limit);
    }
    Ok(entries)
}

fn backend_error(message: String) -> anyhow::Error {
    ZcpError::new(ErrorCode::ApiError, message, "Check network connectivity").into()
}

pub struct ReqwestLogFetcher {
    client: Client,
}

impl ReqwestLogFetcher {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(LOG_REQUEST_TIMEOUT)
            .build()
            .context("cannot build HTTP client")?;
        Ok(Self { client })
    }
}

impl LogFetcher for ReqwestLogFetcher {
    async fn fetch_logs(
        &self,
        access: &LogAccess,
        params: &LogFetchParams,
    ) -> Result<Vec<LogEntry>> {
        let url = log_request_url(access, params)?;
        debug!(host = url.host_str().unwrap_or_default(), "fetching logs");

        let resp = self
            .client
            .get(url)
            .bearer_auth(&access.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| backend_error(format!("log backend unreachable: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| backend_error(format!("failed to read log response: {e}")))?;
        if status != reqwest::StatusCode::OK {
            return Err(backend_error(format!(
                "log backend returned HTTP {}: {body}",
                status.as_u16()
            )));
        }
        parse_log_page(&body, params.limit)
    }
}

/// Health-check GETs. Redirects are followed; any status is a response.
#[derive(Default)]
pub struct ReqwestHttpProbe {
    client: Client,
}

impl ReqwestHttpProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpProbe for ReqwestHttpProbe {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.with_context(|| format!("GET {url}"))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
