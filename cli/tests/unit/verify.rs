//! Health verification of a single service.

use std::time::Duration;

use zcp_cli::application::services::verify::{STARTUP_PATTERN, verify};
use zcp_cli::domain::config::ProbeSettings;
use zcp_cli::domain::error::{ErrorCode, error_code};
use zcp_cli::domain::verify::{CheckStatus, HealthStatus, ServiceKind, VerifyResult};

use crate::mocks::{FakeLogFetcher, FakePlatform, FakeProbe, http_port, log_entry, service};

const BASE: &str = "https://api-1df2-3000.prg1.zerops.app";

fn platform(status: &str, subdomain: bool) -> FakePlatform {
    let mut api = service("api", "s1", "nodejs@22", status);
    api.ports = vec![http_port(3000)];
    api.subdomain_access = subdomain;
    FakePlatform::with_services(vec![api, service("db", "s2", "postgresql@16", "ACTIVE")])
}

fn healthy_probe() -> FakeProbe {
    FakeProbe::default()
        .respond(&format!("{BASE}/health"), 200, "ok")
        .respond(&format!("{BASE}/status"), 200, r#"{"connections":{"db":{"status":"ok"}}}"#)
}

fn statuses(result: &VerifyResult) -> Vec<(&str, CheckStatus)> {
    result
        .checks
        .iter()
        .map(|c| (c.name.as_str(), c.status))
        .collect()
}

#[tokio::test]
async fn test_verify_healthy_runtime_runs_full_battery() {
    let client = platform("RUNNING", true);
    let fetcher = FakeLogFetcher::healthy();
    let probe = healthy_probe();

    let result = verify(&client, &fetcher, &probe, "proj-1", "api", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.kind, ServiceKind::Runtime);
    assert_eq!(result.status, HealthStatus::Healthy);
    assert_eq!(
        statuses(&result),
        [
            ("service_running", CheckStatus::Pass),
            ("no_error_logs", CheckStatus::Pass),
            ("startup_detected", CheckStatus::Pass),
            ("no_recent_errors", CheckStatus::Pass),
            ("http_health", CheckStatus::Pass),
            ("http_status", CheckStatus::Pass),
        ]
    );
    // One log access token serves all log checks.
    assert_eq!(client.count("get_project_log"), 1);
    let queries = fetcher.queries();
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[1].search, STARTUP_PATTERN);
    assert!(queries.iter().all(|q| q.service_id == "s1" && q.limit == 1));

    let requests = probe.requests.lock().expect("lock").clone();
    assert_eq!(requests[0].1, Duration::from_secs(5));
    assert_eq!(requests[1].1, Duration::from_secs(10));
}

#[tokio::test]
async fn test_verify_managed_service_only_checks_running() {
    let client = platform("RUNNING", true);
    let fetcher = FakeLogFetcher::healthy();
    let probe = FakeProbe::default();

    let result = verify(&client, &fetcher, &probe, "proj-1", "db", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.kind, ServiceKind::Managed);
    assert_eq!(statuses(&result), [("service_running", CheckStatus::Pass)]);
    assert!(fetcher.queries().is_empty());
    assert!(probe.requested().is_empty());
}

#[tokio::test]
async fn test_verify_stopped_runtime_skips_follow_ups() {
    let client = platform("STOPPED", true);
    let fetcher = FakeLogFetcher::healthy();
    let probe = healthy_probe();

    let result = verify(&client, &fetcher, &probe, "proj-1", "api", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.status, HealthStatus::Unhealthy);
    assert_eq!(result.checks.len(), 6);
    assert!(
        result.checks[1..]
            .iter()
            .all(|c| c.status == CheckStatus::Skip && c.detail == "service not running")
    );
    assert_eq!(client.count("get_project_log"), 0);
}

#[tokio::test]
async fn test_verify_error_logs_degrade() {
    let client = platform("RUNNING", true);
    let fetcher = FakeLogFetcher::new(|p| {
        if p.severity == "error" {
            Ok(vec![log_entry("TypeError: undefined is not a function")])
        } else {
            Ok(vec![log_entry("listening on :3000")])
        }
    });

    let result = verify(&client, &fetcher, &healthy_probe(), "proj-1", "api", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.status, HealthStatus::Degraded);
    assert_eq!(result.checks[1].status, CheckStatus::Fail);
    assert_eq!(result.checks[1].detail, "TypeError: undefined is not a function");
    assert_eq!(result.checks[3].status, CheckStatus::Fail);
}

#[tokio::test]
async fn test_verify_log_backend_down_skips_instead_of_failing() {
    let client = platform("RUNNING", true).failing("get_project_log", "FORBIDDEN", "no log access");

    let result = verify(
        &client,
        &FakeLogFetcher::healthy(),
        &healthy_probe(),
        "proj-1",
        "api",
        &ProbeSettings::default(),
    )
    .await
    .expect("verify");

    assert_eq!(result.status, HealthStatus::Healthy);
    for check in &result.checks[1..4] {
        assert_eq!(check.status, CheckStatus::Skip);
        assert!(check.detail.starts_with("log backend unavailable"));
    }
}

#[tokio::test]
async fn test_verify_log_fetch_error_skips_that_check() {
    let client = platform("RUNNING", true);
    let fetcher = FakeLogFetcher::new(|p| {
        if p.search.is_empty() {
            Err("connection reset".to_string())
        } else {
            Ok(vec![log_entry("ready")])
        }
    });

    let result = verify(&client, &fetcher, &healthy_probe(), "proj-1", "api", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.checks[1].status, CheckStatus::Skip);
    assert_eq!(result.checks[2].status, CheckStatus::Pass);
    assert_eq!(result.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_verify_missing_startup_message_fails() {
    let client = platform("RUNNING", true);
    let fetcher = FakeLogFetcher::new(|_| Ok(Vec::new()));

    let result = verify(&client, &fetcher, &healthy_probe(), "proj-1", "api", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.checks[2].status, CheckStatus::Fail);
    assert_eq!(result.checks[2].detail, "no startup message found in last 5m");
    assert_eq!(result.status, HealthStatus::Degraded);
}

#[tokio::test]
async fn test_verify_subdomain_disabled_skips_http() {
    let client = platform("RUNNING", false);
    let probe = FakeProbe::default();

    let result = verify(&client, &FakeLogFetcher::healthy(), &probe, "proj-1", "api", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.checks[4].status, CheckStatus::Skip);
    assert!(result.checks[4].detail.contains("action=enable"));
    assert_eq!(result.checks[5].status, CheckStatus::Skip);
    assert!(probe.requested().is_empty());
    assert_eq!(result.status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_verify_http_failures_degrade() {
    let client = platform("RUNNING", true);
    let probe = FakeProbe::default()
        .refuse(&format!("{BASE}/health"))
        .respond(&format!("{BASE}/status"), 200, r#"{"connections":{"db":{"status":"timeout"}}}"#);

    let result = verify(&client, &FakeLogFetcher::healthy(), &probe, "proj-1", "api", &ProbeSettings::default())
        .await
        .expect("verify");

    assert_eq!(result.status, HealthStatus::Degraded);
    assert_eq!(result.checks[4].status, CheckStatus::Fail);
    assert!(result.checks[4].detail.starts_with("request failed"));
    assert_eq!(result.checks[5].detail, "connection 'db': timeout");
}

#[tokio::test]
async fn test_verify_unknown_hostname() {
    let client = platform("RUNNING", true);

    let err = verify(
        &client,
        &FakeLogFetcher::healthy(),
        &FakeProbe::default(),
        "proj-1",
        "web",
        &ProbeSettings::default(),
    )
    .await
    .expect_err("unknown");

    assert_eq!(error_code(&err), Some(ErrorCode::ServiceNotFound));
}
