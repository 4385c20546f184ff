//! Application service: health verification of a single service.
//!
//! One `get_project_log` call per pass; its access token serves all three
//! log checks. Log backend problems downgrade a check to `skip`, never to
//! `fail`.

use std::time::Duration;

use anyhow::Result;
use chrono::{TimeDelta, Utc};
use tracing::{debug, warn};
use zcp_common::{LogAccess, LogFetchParams};

use crate::application::ports::{HttpProbe, LogFetcher, PlatformClient};
use crate::application::services::subdomain::resolve_subdomain_urls;
use crate::domain::config::ProbeSettings;
use crate::domain::identifiers::resolve_service;
use crate::domain::verify::{
    CHECK_HTTP_HEALTH, CHECK_HTTP_STATUS, CHECK_NO_ERROR_LOGS, CHECK_NO_RECENT_ERRORS,
    CHECK_STARTUP_DETECTED, CheckResult, CheckStatus, RUNTIME_FOLLOW_UP_CHECKS, ServiceKind,
    VerifyResult, aggregate_status, check_service_running, classify_service,
    evaluate_health_response, evaluate_status_response,
};

pub const STARTUP_PATTERN: &str = "listening|started|ready";
const ERROR_WINDOW_MINUTES: i64 = 5;
const RECENT_ERROR_WINDOW_MINUTES: i64 = 2;
const STARTUP_WINDOW_MINUTES: i64 = 5;

const NOT_RUNNING_DETAIL: &str = "service not running";
const SUBDOMAIN_DISABLED_DETAIL: &str =
    "subdomain not enabled, call zerops_subdomain action=enable first";
const SUBDOMAIN_UNRESOLVED_DETAIL: &str = "cannot resolve subdomain URL";

/// Shared log access of one pass: the token, or why there is none.
type Access = std::result::Result<LogAccess, String>;

fn backend_unavailable(name: &str, why: &str) -> CheckResult {
    CheckResult::skip(name, format!("log backend unavailable: {why}"))
}

async fn error_log_check(
    fetcher: &impl LogFetcher,
    access: &Access,
    name: &str,
    service_id: &str,
    window_minutes: i64,
) -> CheckResult {
    let access = match access {
        Ok(a) => a,
        Err(why) => return backend_unavailable(name, why),
    };
    let params = LogFetchParams {
        service_id: service_id.to_string(),
        severity: "error".to_string(),
        since: Some(Utc::now() - TimeDelta::minutes(window_minutes)),
        limit: 1,
        ..LogFetchParams::default()
    };
    match fetcher.fetch_logs(access, &params).await {
        Ok(entries) => match entries.first() {
            Some(entry) => CheckResult::fail(name, entry.message.clone()),
            None => CheckResult::pass(name),
        },
        Err(e) => backend_unavailable(name, &e.to_string()),
    }
}

async fn startup_check(fetcher: &impl LogFetcher, access: &Access, service_id: &str) -> CheckResult {
    let access = match access {
        Ok(a) => a,
        Err(why) => return backend_unavailable(CHECK_STARTUP_DETECTED, why),
    };
    let params = LogFetchParams {
        service_id: service_id.to_string(),
        since: Some(Utc::now() - TimeDelta::minutes(STARTUP_WINDOW_MINUTES)),
        limit: 1,
        search: STARTUP_PATTERN.to_string(),
        ..LogFetchParams::default()
    };
    match fetcher.fetch_logs(access, &params).await {
        Ok(entries) if entries.is_empty() => CheckResult::fail(
            CHECK_STARTUP_DETECTED,
            "no startup message found in last 5m",
        ),
        Ok(_) => CheckResult::pass(CHECK_STARTUP_DETECTED),
        Err(e) => backend_unavailable(CHECK_STARTUP_DETECTED, &e.to_string()),
    }
}

async fn http_check(
    probe: &impl HttpProbe,
    name: &str,
    url: &str,
    timeout: Duration,
    evaluate: fn(u16, &[u8]) -> CheckResult,
) -> CheckResult {
    debug!(url, "probing");
    match probe.get(url, timeout).await {
        Ok(resp) => evaluate(resp.status, &resp.body),
        Err(e) => CheckResult::fail(name, format!("request failed: {e}")),
    }
}

/// Runs the check battery for `hostname` and aggregates it.
///
/// Managed services only get `service_running`. For runtimes a failed
/// liveness check skips everything after it.
///
/// # Errors
///
/// Fails only if the service list cannot be fetched or the hostname is
/// unknown; check problems are reported inside the result.
pub async fn verify(
    client: &impl PlatformClient,
    fetcher: &impl LogFetcher,
    probe: &impl HttpProbe,
    project_id: &str,
    hostname: &str,
    timeouts: &ProbeSettings,
) -> Result<VerifyResult> {
    let services = client.list_services(project_id).await?;
    let svc = resolve_service(&services, hostname)?;
    let kind = classify_service(&svc.type_info.version_name);

    let running = check_service_running(&svc.status);
    let is_running = running.status == CheckStatus::Pass;
    let mut checks = vec![running];

    if kind == ServiceKind::Runtime {
        if is_running {
            let access: Access = client
                .get_project_log(project_id)
                .await
                .map_err(|e| e.to_string());
            if let Err(why) = &access {
                warn!(error = %why, "log access unavailable");
            }

            checks.push(
                error_log_check(fetcher, &access, CHECK_NO_ERROR_LOGS, &svc.id, ERROR_WINDOW_MINUTES).await,
            );
            checks.push(startup_check(fetcher, &access, &svc.id).await);
            checks.push(
                error_log_check(
                    fetcher,
                    &access,
                    CHECK_NO_RECENT_ERRORS,
                    &svc.id,
                    RECENT_ERROR_WINDOW_MINUTES,
                )
                .await,
            );

            let url = if svc.subdomain_access {
                let first_port = svc.ports.get(..1).unwrap_or_default();
                resolve_subdomain_urls(client, project_id, svc, first_port)
                    .await
                    .into_iter()
                    .next()
            } else {
                None
            };
            match url {
                Some(url) => {
                    checks.push(
                        http_check(
                            probe,
                            CHECK_HTTP_HEALTH,
                            &format!("{url}/health"),
                            timeouts.health(),
                            evaluate_health_response,
                        )
                        .await,
                    );
                    checks.push(
                        http_check(
                            probe,
                            CHECK_HTTP_STATUS,
                            &format!("{url}/status"),
                            timeouts.status(),
                            evaluate_status_response,
                        )
                        .await,
                    );
                }
                None => {
                    let detail = if svc.subdomain_access {
                        SUBDOMAIN_UNRESOLVED_DETAIL
                    } else {
                        SUBDOMAIN_DISABLED_DETAIL
                    };
                    checks.push(CheckResult::skip(CHECK_HTTP_HEALTH, detail));
                    checks.push(CheckResult::skip(CHECK_HTTP_STATUS, detail));
                }
            }
        } else {
            checks.extend(
                RUNTIME_FOLLOW_UP_CHECKS
                    .iter()
                    .map(|name| CheckResult::skip(name, NOT_RUNNING_DETAIL)),
            );
        }
    }

    let status = aggregate_status(&checks);
    Ok(VerifyResult {
        hostname: hostname.to_string(),
        kind,
        status,
        checks,
    })
}
