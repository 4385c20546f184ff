//! Log reading through the project log backend.

use zcp_cli::application::services::logs::{DEFAULT_LOG_LIMIT, LogsQuery, logs};
use zcp_cli::domain::error::{ErrorCode, error_code};

use crate::mocks::{FakeLogFetcher, FakePlatform, log_entry, service};

fn platform() -> FakePlatform {
    FakePlatform::with_services(vec![service("api", "s1", "nodejs@22", "ACTIVE")])
}

#[tokio::test]
async fn test_logs_forwards_query_and_keeps_entry_ids() {
    let fetcher = FakeLogFetcher::new(|_| Ok(vec![log_entry("boom"), log_entry("again")]));

    let result = logs(
        &platform(),
        &fetcher,
        "proj-1",
        &LogsQuery {
            hostname: "api",
            severity: "error",
            since: "30m",
            limit: 2,
            search: "boom",
        },
    )
    .await
    .expect("logs");

    assert_eq!(result.entries.len(), 2);
    assert!(result.entries.iter().all(|e| e.id == "log-1"));
    assert!(result.has_more);

    let query = &fetcher.queries()[0];
    assert_eq!(query.service_id, "s1");
    assert_eq!(query.severity, "error");
    assert_eq!(query.limit, 2);
    assert_eq!(query.search, "boom");
    assert!(query.since.is_some());
}

#[tokio::test]
async fn test_logs_default_limit() {
    let fetcher = FakeLogFetcher::new(|_| Ok(vec![log_entry("one")]));

    let result = logs(
        &platform(),
        &fetcher,
        "proj-1",
        &LogsQuery {
            hostname: "api",
            ..LogsQuery::default()
        },
    )
    .await
    .expect("logs");

    assert!(!result.has_more);
    assert_eq!(fetcher.queries()[0].limit, DEFAULT_LOG_LIMIT);
}

#[tokio::test]
async fn test_logs_invalid_since_checked_first() {
    let client = platform();
    let fetcher = FakeLogFetcher::healthy();

    let err = logs(
        &client,
        &fetcher,
        "proj-1",
        &LogsQuery {
            hostname: "missing",
            since: "2000m",
            ..LogsQuery::default()
        },
    )
    .await
    .expect_err("since");

    assert_eq!(error_code(&err), Some(ErrorCode::InvalidParameter));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_logs_backend_error_propagates() {
    let fetcher = FakeLogFetcher::new(|_| Err("log backend returned HTTP 502".to_string()));

    let err = logs(
        &platform(),
        &fetcher,
        "proj-1",
        &LogsQuery {
            hostname: "api",
            ..LogsQuery::default()
        },
    )
    .await
    .expect_err("backend");

    assert!(err.to_string().contains("502"));
}
